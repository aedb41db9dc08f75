// Brand name normalization for incoming listings
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical brand names and the lower-cased spellings that resolve to them.
const BRAND_ALIASES: &[(&str, &[&str])] = &[
    ("Alfa Romeo", &["alfa", "alfa romeo", "alfaromeo"]),
    ("Aston Martin", &["aston", "aston martin", "astonmartin"]),
    ("Audi", &["audi", "aodi"]),
    ("Bentley", &["bentley", "bently"]),
    ("BMW", &["bmw", "b.m.w", "b m w"]),
    ("BYD", &["byd", "b.y.d"]),
    ("Cadillac", &["cadillac", "cadilac", "caddy"]),
    ("Chery", &["chery", "cherry"]),
    // the last spelling carries Cyrillic "ет"
    ("Chevrolet", &["chevy", "chevrolet", "chevrol\u{435}\u{442}"]),
    ("Citroën", &["citroen", "citroan", "citroën"]),
    ("Cupra", &["cupra", "cuppa"]),
    ("Dacia", &["dacia", "dacia renault"]),
    ("DFSK", &["dfsk", "dongfeng", "d.f.s.k"]),
    ("Dodge", &["dodge", "dodge ram"]),
    ("DS", &["ds", "d.s", "ds automobiles"]),
    ("Ferrari", &["ferrari", "ferarri", "ferari"]),
    ("Fiat", &["fiat", "fiat chrysler"]),
    ("Ford", &["ford", "ford motor"]),
    ("Geely", &["geely", "gely", "geely auto"]),
    ("GMC", &["gmc", "g.m.c", "general motors"]),
    ("Great Wall", &["great wall", "greatwall", "gwm", "great wall motors"]),
    ("Honda", &["honda", "honda motors"]),
    ("Hyundai", &["hyundai", "hundai", "hyunday"]),
    ("Infiniti", &["infiniti", "infinity", "infinti"]),
    ("Jaguar", &["jaguar", "jag", "jaquar"]),
    ("Jeep", &["jeep", "jeep chrysler"]),
    ("Jetour", &["jetour", "jetour auto"]),
    ("Kia", &["kia", "kia motors", "kiah"]),
    ("Lamborghini", &["lamborghini", "lambo", "lamborgini"]),
    ("Lancia", &["lancia", "lancia automobiles"]),
    ("Land Rover", &["land rover", "landrover", "range rover", "rangerover"]),
    ("Lexus", &["lexus", "lexsus"]),
    ("Maserati", &["maserati", "masserati", "maserati spa"]),
    ("Mazda", &["mazda", "mazda motors"]),
    (
        "Mercedes",
        &["mercedes", "mercedes benz", "mercedes-benz", "merc", "benz"],
    ),
    ("MG", &["mg", "m.g", "morris garages"]),
    (
        "Mini Cooper",
        &["mini", "mini cooper", "cooper", "mini coop", "mini cooper s"],
    ),
    ("Mitsubishi", &["mitsubishi", "mitsu", "mitsubishi motors"]),
    ("Nissan", &["nissan", "nisan"]),
    ("Opel", &["opel", "oppel"]),
    ("Peugeot", &["peugeot", "peugot", "puegeot"]),
    ("Porsche", &["porsche", "porche", "posche"]),
    ("Renault", &["renault", "renaul"]),
    (
        "Rolls-Royce",
        &["rolls royce", "rolls-royce", "rollsroyce", "rolls"],
    ),
    ("Seat", &["seat", "seat sa"]),
    ("Skoda", &["skoda", "škoda", "skoda auto"]),
    ("Subaru", &["subaru", "subaro"]),
    ("Suzuki", &["suzuki", "suzuky"]),
    ("Toyota", &["toyota", "toyata", "toyotta", "toyota motors"]),
    (
        "Volkswagen",
        &["volkswagen", "vw", "volkswagon", "volks wagen"],
    ),
    ("Volvo", &["volvo", "volvo cars"]),
];

static ALIAS_TABLE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    BRAND_ALIASES
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
});

/// Maps a free-text manufacturer name to its canonical display form.
///
/// Blank input is returned unchanged. Known aliases resolve through the
/// fixed brand table (case-insensitive, surrounding whitespace ignored);
/// anything else falls back to [`title_case`].
pub fn normalize(make: &str) -> String {
    if make.trim().is_empty() {
        return make.to_string();
    }

    let key = make.trim().to_lowercase();
    match ALIAS_TABLE.get(key.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => title_case(make),
    }
}

/// Capitalizes the first letter of every whitespace-separated word and
/// lower-cases the rest. Words are re-joined with single spaces.
///
/// Blank input yields an empty string.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Whether `make` is already stored in the form [`normalize`] would produce.
pub fn is_canonical(make: &str) -> bool {
    normalize(make) == make
}
