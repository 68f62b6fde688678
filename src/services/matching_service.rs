use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::application::Scorecard;
use crate::services::skill_extraction::normalize_skills;

pub const UNSCORED_JOB_SCORE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
pub const NO_CV_SCORE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

const NO_REQUIREMENTS_STRENGTHS: &str =
    "General profile completeness looks good, but job has no required skills configured.";
const NO_REQUIREMENTS_WEAKNESSES: &str =
    "No specific skill gaps detected due to missing required skills in job post.";
const NO_MATCHES_STRENGTHS: &str =
    "No direct required skill matches were detected from the uploaded CV.";
const NO_GAPS_WEAKNESSES: &str = "No major skill gaps detected for this role.";
const NO_CV_STRENGTHS: &str = "Application submitted without an uploaded CV profile.";
const NO_CV_WEAKNESSES: &str = "Upload a structured CV to unlock stronger matching analysis.";

/// Outcome of comparing one CV against one job's requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAnalysis {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: String,
    pub weaknesses: String,
    pub match_score: Decimal,
}

/// Scores a skill set and experience against required skills.
///
/// Both skill lists are normalized first. Jobs without requirements get a flat
/// 80 so candidates are not penalized for an incomplete posting.
pub fn score(cv_skills: &[String], years_of_experience: i32, required_skills: &[String]) -> MatchAnalysis {
    let cv_skills = normalize_skills(cv_skills);
    let required = normalize_skills(required_skills);

    if required.is_empty() {
        return MatchAnalysis {
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            strengths: NO_REQUIREMENTS_STRENGTHS.to_string(),
            weaknesses: NO_REQUIREMENTS_WEAKNESSES.to_string(),
            match_score: UNSCORED_JOB_SCORE,
        };
    }

    let (matched, missing): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|skill| cv_skills.contains(skill));

    let base = Decimal::from(matched.len() as i64) / Decimal::from(required.len() as i64)
        * Decimal::ONE_HUNDRED;
    let bonus = (Decimal::from(years_of_experience.max(0)) * Decimal::new(15, 1)).min(Decimal::TEN);
    let match_score = (base + bonus).round_dp(2).min(Decimal::ONE_HUNDRED);

    let strengths = if matched.is_empty() {
        NO_MATCHES_STRENGTHS.to_string()
    } else {
        format!(
            "Strong alignment in: {}. Experience years: {}.",
            matched.join(", "),
            years_of_experience
        )
    };

    let weaknesses = if missing.is_empty() {
        NO_GAPS_WEAKNESSES.to_string()
    } else {
        format!(
            "Potential gaps for this role: {}. Consider highlighting related projects/training.",
            missing.join(", ")
        )
    };

    MatchAnalysis {
        matched_skills: matched,
        missing_skills: missing,
        strengths,
        weaknesses,
        match_score,
    }
}

fn clamp_score(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

/// Sub-scores are offsets of the overall score, not independent measurements.
pub fn scorecard_for(analysis: &MatchAnalysis, generated_at: DateTime<Utc>) -> Scorecard {
    let overall = analysis.match_score;
    Scorecard {
        skill_match_score: clamp_score(overall),
        experience_score: clamp_score(overall - Decimal::from(5)),
        education_score: clamp_score(overall - Decimal::TEN),
        certifications_score: clamp_score(overall - Decimal::from(8)),
        overall_score: overall,
        strengths_breakdown: analysis.strengths.clone(),
        gaps_breakdown: analysis.weaknesses.clone(),
        generated_at,
    }
}

/// Fixed assessment for applications submitted without any CV on file.
pub fn no_cv_scorecard(generated_at: DateTime<Utc>) -> Scorecard {
    Scorecard {
        skill_match_score: NO_CV_SCORE,
        experience_score: Decimal::from(20),
        education_score: Decimal::from(15),
        certifications_score: Decimal::TEN,
        overall_score: NO_CV_SCORE,
        strengths_breakdown: NO_CV_STRENGTHS.to_string(),
        gaps_breakdown: NO_CV_WEAKNESSES.to_string(),
        generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn partial_match_with_experience_bonus() {
        let analysis = score(&skills(&["c#", "sql"]), 3, &skills(&["c#", "sql", "azure"]));
        assert_eq!(analysis.matched_skills, skills(&["c#", "sql"]));
        assert_eq!(analysis.missing_skills, skills(&["azure"]));
        assert_eq!(analysis.match_score, dec("71.17"));
        assert_eq!(
            analysis.strengths,
            "Strong alignment in: c#, sql. Experience years: 3."
        );
        assert_eq!(
            analysis.weaknesses,
            "Potential gaps for this role: azure. Consider highlighting related projects/training."
        );
    }

    #[test]
    fn empty_requirements_score_eighty_regardless_of_candidate() {
        for (cv, years) in [(skills(&[]), 0), (skills(&["react"]), 40)] {
            let analysis = score(&cv, years, &skills(&["  ", ""]));
            assert_eq!(analysis.match_score, dec("80"));
            assert_eq!(analysis.strengths, NO_REQUIREMENTS_STRENGTHS);
            assert_eq!(analysis.weaknesses, NO_REQUIREMENTS_WEAKNESSES);
        }
    }

    #[test]
    fn score_is_capped_at_one_hundred() {
        let analysis = score(&skills(&["SQL", "Docker"]), 12, &skills(&["sql", "docker"]));
        assert_eq!(analysis.match_score, dec("100"));
        assert_eq!(analysis.weaknesses, NO_GAPS_WEAKNESSES);
    }

    #[test]
    fn experience_bonus_caps_at_ten() {
        let analysis = score(&skills(&[]), 50, &skills(&["rust", "go"]));
        assert_eq!(analysis.match_score, dec("10"));
        assert_eq!(analysis.strengths, NO_MATCHES_STRENGTHS);
    }

    #[test]
    fn negative_experience_earns_no_bonus() {
        let analysis = score(&skills(&["x"]), -10, &skills(&["rust"]));
        assert_eq!(analysis.match_score, Decimal::ZERO);

        let partial = score(&skills(&["rust"]), -3, &skills(&["rust", "go"]));
        assert_eq!(partial.match_score, dec("50"));
    }

    #[test]
    fn rounding_uses_two_decimal_places() {
        let analysis = score(&skills(&["a"]), 0, &skills(&["a", "b", "c"]));
        assert_eq!(analysis.match_score, dec("33.33"));
    }

    #[test]
    fn scorecard_offsets_clamp_at_zero() {
        let analysis = score(&skills(&[]), 4, &skills(&["x"]));
        assert_eq!(analysis.match_score, dec("6"));
        let card = scorecard_for(&analysis, Utc::now());
        assert_eq!(card.skill_match_score, dec("6"));
        assert_eq!(card.experience_score, dec("1"));
        assert_eq!(card.education_score, Decimal::ZERO);
        assert_eq!(card.certifications_score, Decimal::ZERO);
        assert_eq!(card.overall_score, dec("6"));
    }

    #[test]
    fn scorecard_offsets_follow_overall() {
        let analysis = score(&skills(&["c#", "sql"]), 3, &skills(&["c#", "sql", "azure"]));
        let card = scorecard_for(&analysis, Utc::now());
        assert_eq!(card.experience_score, dec("66.17"));
        assert_eq!(card.education_score, dec("61.17"));
        assert_eq!(card.certifications_score, dec("63.17"));
    }

    #[test]
    fn no_cv_scorecard_uses_fixed_low_scores() {
        let card = no_cv_scorecard(Utc::now());
        assert_eq!(card.overall_score, dec("20"));
        assert_eq!(card.skill_match_score, dec("20"));
        assert_eq!(card.experience_score, dec("20"));
        assert_eq!(card.education_score, dec("15"));
        assert_eq!(card.certifications_score, dec("10"));
        assert_eq!(card.strengths_breakdown, NO_CV_STRENGTHS);
    }
}
