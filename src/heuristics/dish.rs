//! Dish-name classifier: is this text a bare dish name or recipe instructions?

/// Measurement units and cooking verbs. Any hit means the text is instructional.
const RECIPE_KEYWORDS: &[&str] = &[
    "cup",
    "tablespoon",
    "teaspoon",
    "tbsp",
    "tsp",
    "gram",
    "ounce",
    "pounds",
    "litre",
    "liter",
    "boil",
    "simmer",
    "stir",
    "mix",
    "chop",
    "dice",
    "slice",
    "bake",
    "preheat",
    "saute",
    "sauté",
    "whisk",
    "knead",
    "marinate",
    "minutes",
    "oven",
    "until",
    "ingredients",
    "instructions",
];

/// Well-known traditional dishes, matched as substrings of the lowercased text.
const KNOWN_DISHES: &[&str] = &[
    "jollof",
    "egusi",
    "pounded yam",
    "fufu",
    "suya",
    "moi moi",
    "moin moin",
    "ogbono",
    "efo riro",
    "banga",
    "ofada",
    "amala",
    "ewedu",
    "afang",
    "edikang ikong",
    "pepper soup",
    "fried rice",
    "nkwobi",
    "akara",
    "chin chin",
    "puff puff",
    "waakye",
    "kenkey",
    "banku",
    "injera",
    "bobotie",
    "tagine",
    "couscous",
    "biryani",
    "paella",
    "lasagna",
    "risotto",
    "pad thai",
    "ramen",
    "sushi",
    "tacos",
    "enchiladas",
    "gumbo",
    "jambalaya",
    "goulash",
    "moussaka",
    "shakshuka",
    "falafel",
    "hummus",
    "curry",
    "stroganoff",
    "carbonara",
    "bolognese",
    "ratatouille",
    "pierogi",
];

/// Short phrases with at most this many tokens are assumed to be dish names.
const MAX_DISH_TOKENS: usize = 3;

/// Classify free text as a likely dish name.
///
/// Instruction keywords take precedence over the known-dish list, which takes
/// precedence over the token-count fallback.
pub fn is_likely_dish(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }

    if RECIPE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return false;
    }

    if KNOWN_DISHES.iter().any(|d| lower.contains(d)) {
        return true;
    }

    lower.split_whitespace().count() <= MAX_DISH_TOKENS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_dishes() {
        assert!(is_likely_dish("Jollof Rice"));
        assert!(is_likely_dish("Egusi"));
        assert!(is_likely_dish("my grandmother's jollof for big family parties"));
    }

    #[test]
    fn test_instructions_are_not_dishes() {
        assert!(!is_likely_dish("mix 2 cups flour and boil"));
        // Instruction keywords win even over a known dish name
        assert!(!is_likely_dish("boil the egusi"));
    }

    #[test]
    fn test_blank_fails_closed() {
        assert!(!is_likely_dish(""));
        assert!(!is_likely_dish("   \n\t"));
    }

    #[test]
    fn test_token_boundary() {
        assert!(is_likely_dish("spicy lentil stew"));
        assert!(!is_likely_dish("my favourite lentil stew"));
        assert!(!is_likely_dish("a very long sentence describing five separate steps"));
    }

    #[test]
    fn test_short_instruction_is_not_dish() {
        assert!(!is_likely_dish("stir well"));
    }
}
