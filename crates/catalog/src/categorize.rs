//! Product name categorization.
//!
//! Source rows frequently arrive with the category columns blank; operators
//! name items consistently enough ("나이키 후드집업", "Carhartt JACKET") that
//! a keyword pass fills the gap. Rules are ordered specific-first, so
//! "후드집업" classifies as a zip-up before the plain hoodie rule can match.

/// A category assignment: fine-grained label plus coarse grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: &'static str,
    pub upper_category: &'static str,
}

/// Fallback when nothing matches.
pub const UNCLASSIFIED: Classification = Classification {
    category: "Etc",
    upper_category: "Others",
};

/// Ordered keyword rules. Matching is done on the uppercased, space-stripped
/// name, so keywords are stored the same way.
const RULES: &[(&[&str], &str, &str)] = &[
    // Tops
    (&["후드집업", "ZIPUP", "집업"], "Zip-up Hoodie", "Tops"),
    (&["후드", "HOOD", "HOODIE"], "Hoodie", "Tops"),
    (&["맨투맨", "MTM", "SWEATSHIRT", "스웻"], "Sweatshirt", "Tops"),
    (
        &["니트", "KNIT", "SWEATER", "스웨터", "가디건", "CARDIGAN"],
        "Knit/Sweater",
        "Tops",
    ),
    (&["반팔", "SHORT", "TEE"], "T-Shirt (Short)", "Tops"),
    (&["긴팔", "LONGSLEEVE", "LONGTEE"], "T-Shirt (Long)", "Tops"),
    (
        &["셔츠", "SHIRT", "남방", "CHECK", "STRIPE"],
        "Shirt",
        "Tops",
    ),
    (&["카라", "PK", "POLO", "피케"], "Pique Shirt", "Tops"),
    (&["조끼", "VEST", "베스트"], "Vest", "Tops"),
    (&["티셔츠", "T-SHIRT"], "T-Shirt (Short)", "Tops"),
    // Outerwear
    (
        &["바람막이", "WINDBREAKER", "윈드브레이커"],
        "Windbreaker",
        "Outerwear",
    ),
    (
        &["패딩", "PADDING", "DOWN", "PUFFER", "다운"],
        "Padding/Down",
        "Outerwear",
    ),
    (&["코트", "COAT", "TRENCH"], "Coat", "Outerwear"),
    (&["플리스", "FLEECE", "후리스", "뽀글이"], "Fleece", "Outerwear"),
    (&["가죽", "LEATHER", "라이더"], "Leather", "Outerwear"),
    (
        &["자켓", "JACKET", "점퍼", "JUMPER", "블루종", "BLOUSON"],
        "Jacket",
        "Outerwear",
    ),
    // Bottoms
    (&["반바지", "SHORTS", "쇼츠"], "Shorts", "Bottoms"),
    (
        &["청바지", "JEANS", "DENIM", "데님"],
        "Denim/Jeans",
        "Bottoms",
    ),
    (&["슬랙스", "SLACKS"], "Slacks", "Bottoms"),
    (
        &["트레이닝", "TRAINING", "JOGGER", "조거", "츄리닝", "SWEATPANTS"],
        "Sweatpants/Jogger",
        "Bottoms",
    ),
    (
        &["면바지", "CHINO", "COTTON", "치노"],
        "Chino/Cotton",
        "Bottoms",
    ),
    (&["치마", "SKIRT", "스커트"], "Skirt", "Bottoms"),
    (&["바지", "PANTS"], "Chino/Cotton", "Bottoms"),
    // Others
    (
        &["모자", "CAP", "HAT", "BEANIE", "비니"],
        "Cap/Hat",
        "Others",
    ),
    (&["가방", "BAG", "BACKPACK", "백팩"], "Bag", "Others"),
    (&["신발", "SHOES", "SNEAKERS"], "Shoes", "Others"),
    (&["원피스", "DRESS", "OPS"], "Dress", "Others"),
    (
        &["벨트", "BELT", "넥타이", "SCARF", "ACC"],
        "Accessory",
        "Others",
    ),
];

/// Classify a product name into (category, upper category).
#[must_use]
pub fn classify(name: &str) -> Classification {
    let normalized: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    for &(keywords, category, upper_category) in RULES {
        if keywords.iter().any(|kw| normalized.contains(kw)) {
            return Classification {
                category,
                upper_category,
            };
        }
    }

    UNCLASSIFIED
}
