//! Quantity estimator: a plausible amount for an ingredient named without one.

/// One category rule. `variants` are checked in order before `quantity`.
struct QuantityRule {
    keywords: &'static [&'static str],
    variants: &'static [(&'static str, &'static str)],
    quantity: &'static str,
}

const DEFAULT_QUANTITY: &str = "to taste";

// Order matters: earlier rules shadow later ones (stock before chicken,
// eggplant before egg, peanut butter before butter, peppercorn before corn,
// butternut squash before butter).
const RULES: &[QuantityRule] = &[
    // Stocks and broths
    QuantityRule {
        keywords: &["stock", "broth"],
        variants: &[("cube", "2 cubes")],
        quantity: "2 cups",
    },
    // Red meat
    QuantityRule {
        keywords: &["beef", "pork", "lamb", "goat", "mutton", "veal", "turkey", "sausage"],
        variants: &[("ground", "1 pound"), ("minced", "1 pound"), ("steak", "2 steaks")],
        quantity: "1-2 pounds",
    },
    // Poultry
    QuantityRule {
        keywords: &["chicken"],
        variants: &[
            ("breast", "2 breasts"),
            ("thigh", "4 thighs"),
            ("drumstick", "6 drumsticks"),
            ("wing", "1 pound"),
            ("ground", "1 pound"),
        ],
        quantity: "1 whole chicken",
    },
    // Fish
    QuantityRule {
        keywords: &["fish", "salmon", "tilapia", "mackerel", "catfish", "tuna", "cod", "sardine"],
        variants: &[("fillet", "2 fillets"), ("dried", "1 cup"), ("smoked", "1 cup")],
        quantity: "1 pound",
    },
    // Shellfish
    QuantityRule {
        keywords: &["shrimp", "prawn", "crayfish", "crab", "lobster", "mussel", "clam"],
        variants: &[("ground", "2 tablespoons"), ("dried", "1/2 cup")],
        quantity: "1/2 pound",
    },
    // Grains
    QuantityRule {
        keywords: &["rice", "quinoa", "oats", "oatmeal", "couscous", "cornmeal", "semolina", "garri"],
        variants: &[("flour", "2 cups")],
        quantity: "2 cups",
    },
    // Pasta and noodles
    QuantityRule {
        keywords: &["pasta", "spaghetti", "macaroni", "noodle", "penne", "fettuccine", "lasagna"],
        variants: &[],
        quantity: "1 pound",
    },
    // Garlic
    QuantityRule {
        keywords: &["garlic"],
        variants: &[("powder", "1 teaspoon"), ("minced", "1 tablespoon")],
        quantity: "2-3 cloves",
    },
    // Ginger
    QuantityRule {
        keywords: &["ginger"],
        variants: &[("powder", "1 teaspoon"), ("ground", "1 teaspoon")],
        quantity: "1 inch piece",
    },
    // Onions
    QuantityRule {
        keywords: &["onion", "shallot", "scallion", "leek"],
        variants: &[("powder", "1 teaspoon"), ("green", "3 stalks"), ("spring", "3 stalks")],
        quantity: "1 medium",
    },
    // Tomatoes
    QuantityRule {
        keywords: &["tomato"],
        variants: &[
            ("cherry", "1 cup"),
            ("paste", "2 tablespoons"),
            ("puree", "1 cup"),
            ("sauce", "1 cup"),
            ("canned", "1 can"),
        ],
        quantity: "2 medium",
    },
    // Whole spices and starches named after vegetables
    QuantityRule {
        keywords: &["peppercorn", "cornstarch", "corn starch"],
        variants: &[("starch", "2 tablespoons")],
        quantity: "1 teaspoon",
    },
    // Fresh peppers
    QuantityRule {
        keywords: &[
            "bell pepper",
            "scotch bonnet",
            "habanero",
            "jalapeno",
            "chili pepper",
            "tatashe",
            "green pepper",
            "red pepper",
        ],
        variants: &[("flakes", "1 teaspoon")],
        quantity: "2 peppers",
    },
    // Other vegetables
    QuantityRule {
        keywords: &[
            "eggplant", "carrot", "potato", "yam", "plantain", "cabbage", "spinach", "lettuce",
            "kale", "broccoli", "cauliflower", "cucumber", "zucchini", "okra", "mushroom",
            "celery", "corn", "pumpkin", "squash", "ugu",
        ],
        variants: &[("leaves", "2 cups"), ("chopped", "1 cup"), ("sweet corn", "1 cup")],
        quantity: "2 medium",
    },
    // Fruits
    QuantityRule {
        keywords: &[
            "lemon", "lime", "orange", "apple", "banana", "mango", "pineapple", "avocado",
            "berry", "berries", "grape", "pear", "peach",
        ],
        variants: &[("juice", "2 tablespoons"), ("zest", "1 teaspoon")],
        quantity: "1 medium",
    },
    // Nuts and seeds (before dairy and legumes: peanut butter, peanut vs pea)
    QuantityRule {
        keywords: &["peanut", "groundnut", "almond", "cashew", "walnut", "pecan", "egusi", "melon seed", "sesame"],
        variants: &[("butter", "1/2 cup"), ("ground", "1 cup")],
        quantity: "1/2 cup",
    },
    // Dairy and eggs
    QuantityRule {
        keywords: &["milk", "cream", "cheese", "butter", "yogurt", "yoghurt", "egg"],
        variants: &[
            ("egg", "2 large"),
            ("butter", "2 tablespoons"),
            ("cheese", "1 cup"),
            ("cream", "1/2 cup"),
        ],
        quantity: "1 cup",
    },
    // Oils and condiments
    QuantityRule {
        keywords: &[
            "oil", "vinegar", "soy sauce", "ketchup", "mayonnaise", "mustard", "honey", "sugar",
            "bouillon", "maggi", "knorr",
        ],
        variants: &[("palm oil", "1/2 cup"), ("sugar", "1/4 cup"), ("cube", "2 cubes")],
        quantity: "2 tablespoons",
    },
    // Herbs and spices
    QuantityRule {
        keywords: &[
            "salt", "black pepper", "pepper", "thyme", "curry", "paprika", "cumin", "cinnamon",
            "nutmeg", "oregano", "basil", "parsley", "cilantro", "coriander", "bay leaf",
            "bay leaves", "turmeric", "chili", "chilli", "rosemary",
        ],
        variants: &[
            ("salt", "to taste"),
            ("bay lea", "2 leaves"),
            ("fresh", "1/4 cup"),
        ],
        quantity: "1 teaspoon",
    },
    // Legumes
    QuantityRule {
        keywords: &["bean", "lentil", "chickpea", "peas", "locust"],
        variants: &[("can", "1 can"), ("locust", "1 tablespoon")],
        quantity: "1 cup",
    },
    // Flours
    QuantityRule {
        keywords: &["flour", "starch", "baking powder", "baking soda", "yeast"],
        variants: &[("baking", "1 teaspoon"), ("yeast", "1 packet"), ("starch", "2 tablespoons")],
        quantity: "2 cups",
    },
    // Liquids
    QuantityRule {
        keywords: &["water", "juice", "wine", "coconut milk"],
        variants: &[("wine", "1/2 cup")],
        quantity: "1 cup",
    },
];

/// Estimate a quantity for an ingredient name. Deterministic; first matching rule wins.
pub fn estimate_quantity(ingredient_name: &str) -> &'static str {
    let name = ingredient_name.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| name.contains(k)))
        .map(|rule| {
            rule.variants
                .iter()
                .find(|(modifier, _)| name.contains(modifier))
                .map(|(_, q)| *q)
                .unwrap_or(rule.quantity)
        })
        .unwrap_or(DEFAULT_QUANTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(estimate_quantity("ground beef"), "1 pound");
        assert_eq!(estimate_quantity("garlic"), "2-3 cloves");
        assert_eq!(estimate_quantity("xyzzy"), "to taste");
    }

    #[test]
    fn test_variants() {
        assert_eq!(estimate_quantity("beef"), "1-2 pounds");
        assert_eq!(estimate_quantity("Cherry Tomatoes"), "1 cup");
        assert_eq!(estimate_quantity("tomatoes"), "2 medium");
        assert_eq!(estimate_quantity("garlic powder"), "1 teaspoon");
        assert_eq!(estimate_quantity("chicken breast"), "2 breasts");
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(estimate_quantity("chicken stock"), "2 cups");
        assert_eq!(estimate_quantity("eggplant"), "2 medium");
        assert_eq!(estimate_quantity("eggs"), "2 large");
        assert_eq!(estimate_quantity("peanut butter"), "1/2 cup");
        assert_eq!(estimate_quantity("palm oil"), "1/2 cup");
        assert_eq!(estimate_quantity("salt"), "to taste");
        assert_eq!(estimate_quantity("cornstarch"), "2 tablespoons");
        assert_eq!(estimate_quantity("corn starch"), "2 tablespoons");
        assert_eq!(estimate_quantity("black peppercorns"), "1 teaspoon");
        assert_eq!(estimate_quantity("butternut squash"), "2 medium");
        assert_eq!(estimate_quantity("sweet corn"), "1 cup");
    }

    #[test]
    fn test_deterministic() {
        for name in ["ground beef", "egusi", "thyme", "unknown thing"] {
            assert_eq!(estimate_quantity(name), estimate_quantity(name));
        }
    }
}
