use crate::domain::menu_analysis::{
    entities::{RawMenuItem, UserProfile},
    schema::{get_dish_analysis_schema, get_menu_structure_schema},
};

pub const STRUCTURING_SYSTEM_PROMPT: &str = "You extract restaurant menu items from OCR text. \
Reply with a single JSON object and nothing else.";

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a registered dietitian scoring restaurant dishes \
for a specific person. Reply with a single JSON object and nothing else.";

const STRUCTURING_TEMPLATE: &str = "Extract every dish from the menu text below.\n\
Return JSON matching this schema:\n{schema}\n\n\
Rules:\n\
- one entry per dish, in the order they appear on the menu\n\
- keep dish names exactly as printed\n\
- price is a plain number without currency symbol, or null when missing\n\
- include every dish, even ones that conflict with the diner's restrictions\n\
- capture descriptions in full when they mention ingredients relevant to the diner's goals ({goals}) or restrictions ({restrictions})\n\n\
Menu text:\n\"\"\"\n{menu_text}\n\"\"\"";

const DISH_TEMPLATE: &str = "Analyze this dish for the diner described below.\n\
Return JSON matching this schema:\n{schema}\n\n\
Dish: {name}\n\
Description: {description}\n\
Menu section: {category}\n\n\
Diner goals (highest priority first): {goals}\n\
Dietary restrictions: {restrictions}\n\
Recent eating patterns: {patterns}\n\n\
healthScore is 0-100 for how well the dish serves these goals and restrictions. \
Use flags for conflicts with the restrictions and likely allergens, tags for dietary labels \
(e.g. vegetarian, high-protein), improvements for concrete ordering tweaks.";

pub fn build_structuring_prompt(menu_text: &str, profile: &UserProfile) -> String {
    STRUCTURING_TEMPLATE
        .replace("{schema}", &get_menu_structure_schema().to_string())
        .replace("{goals}", &profile.goals_line())
        .replace("{restrictions}", &profile.restrictions_line())
        .replace("{menu_text}", menu_text)
}

pub fn build_dish_prompt(item: &RawMenuItem, profile: &UserProfile) -> String {
    DISH_TEMPLATE
        .replace("{schema}", &get_dish_analysis_schema().to_string())
        .replace("{goals}", &profile.goals_line())
        .replace("{restrictions}", &profile.restrictions_line())
        .replace("{patterns}", &profile.patterns_line())
        .replace("{category}", item.category.as_deref().unwrap_or("not given"))
        .replace("{description}", item.description.as_deref().unwrap_or("not given"))
        .replace("{name}", &item.name)
}
