//! Instruction templates sent to the model.
//!
//! The scenario is spliced in verbatim between double quotes. Nothing is
//! escaped, so a scenario that imitates instruction text can change how the
//! model reads the prompt.

use crate::models::ReportDepth;

/// Builds the instruction text for a scenario at the requested depth.
pub fn build_prompt(scenario: &str, depth: ReportDepth) -> String {
    match depth {
        ReportDepth::Flash => flash_prompt(scenario),
        ReportDepth::DeepDive => deep_dive_prompt(scenario),
    }
}

fn flash_prompt(scenario: &str) -> String {
    format!(
        "Act as a Safety Officer. Write a **SUMMARIZED Flash Report**.\n\
        Scenario: \"{scenario}\"\n\
        Sections: 1. WHAT HAPPENED, 2. IMMEDIATE CAUSE, 3. IMMEDIATE ACTION TAKEN, 4. RISK RATING.\n\
        Be brief: short factual bullet points, no more than one page. \
        Speed and clarity matter more than depth; do not speculate on root causes."
    )
}

fn deep_dive_prompt(scenario: &str) -> String {
    format!(
        "Act as a Lead HSE Investigator and senior safety consultant. \
        Write a **DETAILED Level 3 Incident Investigation Report**.\n\
        Scenario: \"{scenario}\"\n\
        Sections:\n\
        1. INCIDENT HEADER (date, time, location, incident type, report reference).\n\
        2. EXECUTIVE SUMMARY.\n\
        3. DETAILED NARRATIVE & CHRONOLOGY (timeline of events leading up to, during and after the incident).\n\
        4. BARRIER ANALYSIS (Swiss Cheese Model: identify each barrier that failed, was missing or held).\n\
        5. ROOT CAUSE ANALYSIS (5 Whys: ask \"why\" iteratively until the systemic root cause is reached).\n\
        6. SEVERITY & RISK CLASSIFICATION (actual and potential severity, likelihood, resulting risk matrix rating).\n\
        7. RECOMMENDATIONS (corrective and preventive actions with owner and priority).\n\
        Use a formal, objective tone and highlight key findings in **bold**."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "Pump seal failed at 14:00, minor leak, no injuries";

    #[test]
    fn test_prompt_contains_scenario_verbatim() {
        let scenarios = [
            SCENARIO,
            "Operator said \"stop!\" then {slipped} on deck",
            "Gas alarm – H₂S 15 ppm at wellhead 🚨",
            "x",
        ];
        for scenario in scenarios {
            for depth in [ReportDepth::Flash, ReportDepth::DeepDive] {
                let prompt = build_prompt(scenario, depth);
                assert!(prompt.contains(scenario), "{depth}: {scenario}");
                assert!(prompt.contains(&format!("Scenario: \"{scenario}\"")));
            }
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_prompt(SCENARIO, ReportDepth::Flash),
            build_prompt(SCENARIO, ReportDepth::Flash)
        );
        assert_eq!(
            build_prompt(SCENARIO, ReportDepth::DeepDive),
            build_prompt(SCENARIO, ReportDepth::DeepDive)
        );
    }

    #[test]
    fn test_flash_structure() {
        let prompt = build_prompt(SCENARIO, ReportDepth::Flash);
        assert!(prompt.contains("Safety Officer"));
        for section in [
            "WHAT HAPPENED",
            "IMMEDIATE CAUSE",
            "IMMEDIATE ACTION TAKEN",
            "RISK RATING",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("brief"));
        assert!(!prompt.contains("5 Whys"));
    }

    #[test]
    fn test_deep_dive_structure() {
        let prompt = build_prompt(SCENARIO, ReportDepth::DeepDive);
        assert!(prompt.contains("Lead HSE Investigator"));
        for section in [
            "INCIDENT HEADER",
            "EXECUTIVE SUMMARY",
            "NARRATIVE & CHRONOLOGY",
            "BARRIER ANALYSIS",
            "Swiss Cheese",
            "5 Whys",
            "SEVERITY & RISK CLASSIFICATION",
            "RECOMMENDATIONS",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_depths_differ() {
        assert_ne!(
            build_prompt(SCENARIO, ReportDepth::Flash),
            build_prompt(SCENARIO, ReportDepth::DeepDive)
        );
    }
}
