//! Renders object counts into the editing instruction sent with each image.

use crate::scenario::ObjectCounts;

/// Scene-composition rules appended to every prompt.
pub const GUIDELINES: [&str; 8] = [
    "Pedestrians should be on sidewalks, crosswalks, or designated walking areas",
    "Bicycles should be in bike lanes, on roads, or bike paths with riders wearing helmets",
    "Trucks and buses should be appropriately sized and positioned on roads",
    "Motorcycles should be on roads with riders wearing helmets",
    "Cars should be standard passenger vehicles on roads",
    "Maintain realistic perspective with distant objects appearing smaller",
    "Create a natural, realistic traffic scene with proper spacing between objects",
    "Vary the poses, orientations, and positions of objects for diversity",
];

/// Builds the editing prompt for the given counts.
///
/// The output depends only on `counts`.
pub fn build_prompt(counts: &ObjectCounts) -> String {
    let mut prompt = format!(
        "I have an imbalanced dataset and need to create a more balanced distribution of objects. \
         Please add the following objects to this street scene: \
         {} pedestrians, {} bicycles, {} trucks, {} buses, {} motorcycles, and {} cars. \
         Ensure all objects are proportionate to the scene and blend naturally with the environment. \
         Guidelines: ",
        counts.pedestrians,
        counts.bicycles,
        counts.trucks,
        counts.buses,
        counts.motorcycles,
        counts.cars,
    );

    for guideline in GUIDELINES {
        prompt.push_str("- ");
        prompt.push_str(guideline);
        prompt.push(' ');
    }
    prompt.truncate(prompt.trim_end().len());
    prompt
}
