//! Best-effort keyword heuristics over CV text.
//!
//! Matching is plain substring containment on the lowercased text, so "sql"
//! also hits "nosql" and "java" hits "javascript". Scores computed downstream
//! depend on exactly this behaviour.

pub const KNOWN_SKILLS: [&str; 21] = [
    "c#",
    "dotnet",
    "asp.net",
    "sql",
    "entity framework",
    "angular",
    "react",
    "javascript",
    "typescript",
    "azure",
    "aws",
    "docker",
    "kubernetes",
    "python",
    "java",
    "node",
    "html",
    "css",
    "git",
    "rest api",
    "microservices",
];

const CERTIFICATION_PHRASES: [(&str, &str); 4] = [
    ("aws certified", "AWS Certified"),
    ("azure certified", "Azure Certified"),
    ("scrum", "Scrum"),
    ("pmp", "PMP"),
];

const MAX_YEARS_SCANNED: i32 = 20;

/// Vocabulary terms found anywhere in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .filter(|skill| lower.contains(*skill))
        .map(|skill| skill.to_string())
        .collect()
}

/// Trims, lowercases and de-duplicates, keeping first-seen order. Blank
/// entries are dropped.
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.as_ref().trim();
        if skill.is_empty() {
            continue;
        }
        let lower = skill.to_lowercase();
        if !normalized.contains(&lower) {
            normalized.push(lower);
        }
    }
    normalized
}

/// Largest `N` in 20..=1 for which "`N` years" or "`N`+ years" occurs, else 0.
pub fn infer_years_of_experience(text: &str) -> i32 {
    let lower = text.to_lowercase();
    (1..=MAX_YEARS_SCANNED)
        .rev()
        .find(|years| {
            lower.contains(&format!("{}+ years", years)) || lower.contains(&format!("{} years", years))
        })
        .unwrap_or(0)
}

pub fn infer_certifications(text: &str) -> String {
    let lower = text.to_lowercase();
    CERTIFICATION_PHRASES
        .iter()
        .filter(|(phrase, _)| lower.contains(phrase))
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_vocabulary_terms_case_insensitively() {
        let skills = extract_skills("Senior C# developer, SQL Server, Azure and Docker.");
        assert_eq!(skills, vec!["c#", "sql", "azure", "docker"]);
    }

    #[test]
    fn substring_matches_are_kept() {
        let skills = extract_skills("Worked with NoSQL stores and JavaScript");
        assert!(skills.contains(&"sql".to_string()));
        assert!(skills.contains(&"java".to_string()));
        assert!(skills.contains(&"javascript".to_string()));
    }

    #[test]
    fn normalize_trims_lowercases_and_dedupes() {
        let skills = normalize_skills(vec![" C# ", "sql", "", "SQL", "   ", "Azure"]);
        assert_eq!(skills, vec!["c#", "sql", "azure"]);
    }

    #[test]
    fn years_prefers_the_largest_match() {
        assert_eq!(infer_years_of_experience("I have 3 years in QA and 12+ years overall"), 12);
        assert_eq!(infer_years_of_experience("5 Years of Rust"), 5);
        assert_eq!(infer_years_of_experience("fresh graduate"), 0);
    }

    #[test]
    fn years_scan_is_a_substring_scan() {
        // "25 years" contains "5 years"; 25 is outside the scanned range.
        assert_eq!(infer_years_of_experience("25 years"), 5);
    }

    #[test]
    fn certifications_follow_fixed_order() {
        assert_eq!(
            infer_certifications("PMP holder, Certified Scrum Master, AWS Certified Developer"),
            "AWS Certified, Scrum, PMP"
        );
        assert_eq!(infer_certifications("no certs"), "");
    }
}
