//! Generic-list detector: flags extraction results dominated by category words.

use crate::schema::Ingredient;

const GENERIC_TERMS: &[&str] = &[
    "rice",
    "food",
    "vegetable",
    "vegetables",
    "meat",
    "dish",
    "meal",
    "sauce",
    "soup",
    "stew",
    "fruit",
    "grain",
    "protein",
    "spice",
    "seasoning",
    "ingredient",
    "cuisine",
    "produce",
];

const SPECIFIC_TERMS: &[&str] = &[
    "tomato",
    "garlic",
    "chicken",
    "onion",
    "ginger",
    "pepper",
    "beef",
    "goat",
    "fish",
    "shrimp",
    "crayfish",
    "palm oil",
    "egusi",
    "spinach",
    "carrot",
    "potato",
    "plantain",
    "thyme",
    "curry powder",
    "bouillon",
    "scotch bonnet",
    "locust bean",
    "okra",
    "cheese",
    "butter",
    "egg",
];

/// Minimum number of specific matches that makes a list trustworthy.
const MIN_SPECIFIC: usize = 3;

fn matches_any(name: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| name == *t || name.contains(t))
}

/// True when more than half the names are generic and fewer than three are specific.
pub fn is_generic_list(ingredients: &[Ingredient]) -> bool {
    if ingredients.is_empty() {
        return true;
    }

    let (generic, specific) = ingredients.iter().fold((0usize, 0usize), |(g, s), ing| {
        let name = ing.name.to_lowercase();
        (
            g + usize::from(matches_any(&name, GENERIC_TERMS)),
            s + usize::from(matches_any(&name, SPECIFIC_TERMS)),
        )
    });

    generic * 2 > ingredients.len() && specific < MIN_SPECIFIC
}
