//! Prompt text sent alongside the selfie.

use crate::{GeoLocation, QuizAnswers};

/// Build the analysis instructions for one submission.
///
/// `embed_block` asks the model to wrap its answer in a fenced JSON block;
/// it is set when the request carries grounding tools and cannot use the
/// JSON response mode.
pub fn build_prompt(
    answers: &QuizAnswers,
    location: Option<GeoLocation>,
    embed_block: bool,
) -> String {
    let mut prompt = String::from(
        "You are NutriAura AI, a wellness and nutrition coach. Give a holistic, \
         non-diagnostic wellness reading from the attached selfie and the lifestyle \
         answers below. Look for visual cues of fatigue, skin condition and hydration, \
         and cross-check them against the reported habits.\n\n",
    );

    prompt.push_str("Lifestyle answers:\n");
    prompt.push_str(&format!("- Average sleep per night: {} hours\n", answers.sleep_hours));
    prompt.push_str(&format!("- Stress level (1-5): {}\n", answers.stress_level));
    prompt.push_str(&format!("- Energy level (1-5): {}\n", answers.energy_level));
    prompt.push_str(&format!("- Diet quality: {}\n", answers.diet_quality.as_str()));
    prompt.push_str(&format!("- Daily hydration: {}\n", answers.hydration));
    prompt.push_str(&format!(
        "- Weekly activity: {}\n\n",
        answers.activity_level.as_str()
    ));

    prompt.push_str(
        "Score nutrition, sleep, stress and hydration from 0 to 100, where higher is \
         healthier. A high reported stress level lowers the stress score. Add key \
         findings (icon one of nutrition, sleep, stress, hydration) and recommendation \
         groups with three to five concrete items each.\n",
    );

    if let Some(loc) = location {
        prompt.push_str(&format!(
            "\nThe user is near latitude {:.4}, longitude {:.4}. Where it helps, point \
             recommendations at nearby places such as parks, markets or gyms.\n",
            loc.latitude, loc.longitude
        ));
    }

    if embed_block {
        prompt.push_str(
            "\nReply with a single ```json fenced block containing an object with the keys \
             \"scores\" {nutrition, sleep, stress, hydration}, \"keyFindings\" \
             [{title, description, icon}] and \"recommendations\" [{title, description, \
             items}]. Do not put anything else inside the block.\n",
        );
    } else {
        prompt.push_str("\nAnswer strictly in the provided JSON schema.\n");
    }

    prompt
}
