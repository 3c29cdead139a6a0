//! Stationary-phase column registry.
//!
//! Maps chromatographic column names (NIST-style) onto a closed set of 36
//! integer identifiers: 14 named standard non-polar columns plus an
//! "other non-polar" bucket (id 14), then 20 named semi-standard
//! non-polar columns plus an "other semi non-polar" bucket (id 35).
//! Many of the named columns describe very similar stationary phases.

/// Column id for records with no column context (e.g. produced by
/// identity aggregation).
pub const NO_COLUMN: i32 = -1;

/// Named standard non-polar columns, ids `0..14`.
pub const NON_POLAR_MAIN: [&str; 14] = [
    "DB-1",
    "SE-30",
    "OV-101",
    "OV-1",
    "Methyl_Silicone",
    "CP_Sil_5_CB",
    "BP-1",
    "HP-1",
    "SPB-1",
    "RTX-1",
    "Ultra-1",
    "Petrocol_DH",
    "Polydimethyl_siloxane",
    "OV-1,_SE-30,_Methyl_silicone,_SP-2100,_OV-101,_DB-1,_etc.",
];

/// Named semi-standard non-polar columns, ids `15..35`.
pub const SEMI_NON_POLAR_MAIN: [&str; 20] = [
    "5_%_Phenyl_methyl_siloxane",
    "DB-5",
    "HP-5",
    "HP-5MS",
    "VF-5MS",
    "Squalane",
    "HP-5_MS",
    "SE-54",
    "DB-5MS",
    "Apiezon_L",
    "BPX-5",
    "SE-52",
    "CP_Sil_8_CB",
    "SPB-5",
    "RTX-5",
    "TR5-MS",
    "Ultra-2",
    "DB-5_MS",
    "ZB-5",
    "SLB-5_MS",
];

/// Less common standard non-polar column names folded into id
/// [`OTHER_NON_POLAR`].
pub const NON_POLAR_OTHER: [&str; 69] = [
    "Polydimethyl_siloxanes",
    "SF-96",
    "ZB-1",
    "Cross-Linked_Methylsilicone",
    "PONA",
    "CP-Sil_5_CB",
    "HP-101",
    "CBP-1",
    "DC-200",
    "NB-30",
    "SP-2100",
    "Petrocol_DH-100",
    "HP-PONA",
    "Polydimethyl_siloxane:_CP-Sil_5_CB",
    "E-301",
    "Normal_alkane_RI",
    "DB-1MS",
    "RTX-1_PONA",
    "CP-Sil5_CB_MS",
    "CP-Sil",
    "Polymethylsiloxane,_(PMS-20000)",
    "DB-1HT",
    "DB-1-MS",
    "PMS-100",
    "SPB-Sulfur",
    "Optima-1",
    "DB-Petro",
    "CP_Sil_2",
    "CB-1",
    "CP-Sil_5",
    "Ultra-ALLOY-5",
    "TR-1",
    "Elite-1",
    "JXR",
    "RTx-1",
    "RSL-150",
    "CP-Sil_PONA_GB",
    "PB-1",
    "ZB-1_MS",
    "DB-1_MS",
    "LM-1",
    "EC-1",
    "CP-Sil_5_Cb",
    "Ultra_1",
    "SE-33",
    "DB-Petro_100",
    "SE-30_MS",
    "SP_2100",
    "Optima_1",
    "PMS-1000",
    "Se-30",
    "AT-1",
    "Polidimethyl_siloxane",
    "Permaphase_DMS",
    "Solgel-1_(SGE)",
    "CP_Sil-5_CB",
    "VF-1_MS",
    "SSP-1",
    "SPD-1",
    "Methyl_silicone",
    "HP_Ultra_1",
    "TC-1",
    "DB-1_HT",
    "HP_Ultra-1",
    "PE-1HT",
    "HP-1MS",
    "BPA-1",
    "Ultra-1_PONA",
    "GP_SP_2100_DB",
];

/// Less common semi-standard non-polar column names folded into id
/// [`OTHER_SEMI_NON_POLAR`].
pub const SEMI_NON_POLAR_OTHER: [&str; 127] = [
    "Apiezon_M",
    "Vacuum_Grease_Oil_(VM-4)",
    "Polydimethyl_siloxane_with_5_%_Ph_groups",
    "Rxi-5Sil",
    "Rtx-5MS",
    "BP-5",
    "RSL-200",
    "Apolane",
    "CP-Sil_8CB-MS",
    "Rxi-5MS",
    "VF-5_MS",
    "RTX-5_MS",
    "MDN-5",
    "Rxi-5SilMS",
    "SLB-5MS",
    "Mega_5MS",
    "Dexsil_300",
    "C78,_Branched_paraffin",
    "LM-5",
    "OV-3",
    "PTE-5",
    "TR-5_MS",
    "CBP-5",
    "PE-5",
    "AT-5",
    "VF-5",
    "Siloxane,_5_%_Ph",
    "Polydimethyl_siloxane,_5_%_phenyl",
    "Apieson_L",
    "Apieson_L_/_KOH",
    "Porapack_Q",
    "HG-5",
    "5_%_Phenyl_polydimethyl_siloxane",
    "Optima-5",
    "Nonpolar",
    "OV-5",
    "MFE-73",
    "HT-5",
    "Apiezon",
    "Elite-5_MS",
    "Elite-5MS",
    "Lucopren_G_(silicone_elastomer)",
    "BPX5",
    "EC-5",
    "Polydimethyl_siloxane,_unknown_content_of_Ph-groups",
    "DBP-5",
    "Apiezon_L_+_KF",
    "SE-30+Igepal",
    "Apieson_M",
    "Col-Elite_5MS",
    "Optima_5",
    "Rxi-1MS",
    "RTX-5Sil",
    "PE-5ht",
    "NB-54",
    "CP-Sil_8_CB",
    "methyl_silicone_oil_with_5%_Igepal",
    "Silicon_High_Vacuum_Grease_(obsolete)",
    "RTx-5_Sil_MS",
    "Optima-5MS",
    "SF96+Igepal",
    "DC-400",
    "Synachrom",
    "Rxi-5_MS",
    "FSOT-RSL-200",
    "Methyl_phenyl_siloxane_(not_specified)",
    "Mega-5",
    "PoraPLOT_Q",
    "Optima-5_MS",
    "UCW-98",
    "Ultra_2",
    "ZB-5_MS",
    "5_%_Phenyl_methylsiloxane",
    "DP-5",
    "Methylsiloxane,_5_%_Ph_groups",
    "Triacontane",
    "Polydimethyl_siloxane_with_5_%_phenyl_groups",
    "XTI-5",
    "Apiezon_LH_+_KF",
    "Equity-5MS",
    "Equity-5",
    "PS-255",
    "VB-5",
    "OV-73",
    "ZP-5",
    "PE-5ms",
    "MS5",
    "Polydimethyl_siloxane_with_5_%_Ph",
    "Mega_5_MS",
    "HP5-MS",
    "MDN-5S",
    "Apiezon_N",
    "NB-5",
    "Silicone_oil",
    "Methylsiloxane_+_5_%_Ph-groups",
    "PoraPLOT",
    "RTX-5Sil_MS",
    "Equity-5_MS",
    "RTX-5_Sil_MS",
    "Apiezon_L_+_KOH",
    "C103H208",
    "Durabond-5",
    "CP-Sil8",
    "SBP-5",
    "HP-5_MS,_DB-5_MS",
    "HP_Ultra_2",
    "DB5-30W",
    "Adamantyl_siloxane",
    "CP-SIL8",
    "SLB-5ms",
    "DB-5HT",
    "5_%_Phenyl_silicone",
    "ZEBRON-5",
    "Octacosane",
    "OV-101_+_Igepal",
    "DB-5;_CP-Sil_8_CB",
    "SE-30_(10_%)_+_CW-20M_(1_%)",
    "MPS-5",
    "VA-5_MS",
    "n-Dotriacontane",
    "Dexsil_400",
    "Chromosorb_101",
    "RH-5MS",
    "SE-52/54",
    "RTV-502",
    "OV-22",
    "Polydimethyl_siloxane,_5_%_phenyl_groups",
];

/// Bucket id for standard non-polar columns not in [`NON_POLAR_MAIN`].
pub const OTHER_NON_POLAR: i32 = NON_POLAR_MAIN.len() as i32;

/// Bucket id for semi-standard non-polar columns not in
/// [`SEMI_NON_POLAR_MAIN`].
pub const OTHER_SEMI_NON_POLAR: i32 =
    1 + NON_POLAR_MAIN.len() as i32 + SEMI_NON_POLAR_MAIN.len() as i32;

/// Total number of column ids (`0..NUM_COLUMNS`).
pub const NUM_COLUMNS: usize = 2 + NON_POLAR_MAIN.len() + SEMI_NON_POLAR_MAIN.len();

/// Integer identifier for a column name, or [`NO_COLUMN`] for names
/// outside the registry.
#[must_use]
pub fn column_id(name: &str) -> i32 {
    if let Some(i) = NON_POLAR_MAIN.iter().position(|&c| c == name) {
        return i as i32;
    }
    if NON_POLAR_OTHER.contains(&name) {
        return OTHER_NON_POLAR;
    }
    if let Some(i) = SEMI_NON_POLAR_MAIN.iter().position(|&c| c == name) {
        return i as i32 + 1 + NON_POLAR_MAIN.len() as i32;
    }
    if SEMI_NON_POLAR_OTHER.contains(&name) {
        return OTHER_SEMI_NON_POLAR;
    }
    NO_COLUMN
}

/// Name for a column id; `"Unknown"` outside `0..NUM_COLUMNS`.
#[must_use]
pub fn column_name(id: i32) -> &'static str {
    let main_len = NON_POLAR_MAIN.len() as i32;
    if id == OTHER_NON_POLAR {
        return "Other_non_polar";
    }
    if id == OTHER_SEMI_NON_POLAR {
        return "Other_semi_non_polar";
    }
    if (0..main_len).contains(&id) {
        return NON_POLAR_MAIN[id as usize];
    }
    if id > main_len && id < OTHER_SEMI_NON_POLAR {
        return SEMI_NON_POLAR_MAIN[(id - main_len - 1) as usize];
    }
    "Unknown"
}

/// Whether the name denotes a standard non-polar phase (either bucket).
#[must_use]
pub fn is_non_polar_name(name: &str) -> bool {
    NON_POLAR_MAIN.contains(&name) || NON_POLAR_OTHER.contains(&name) || name == "Other_non_polar"
}

/// Whether the name denotes a semi-standard non-polar phase.
#[must_use]
pub fn is_semi_non_polar_name(name: &str) -> bool {
    SEMI_NON_POLAR_MAIN.contains(&name)
        || SEMI_NON_POLAR_OTHER.contains(&name)
        || name == "Other_semi_non_polar"
}

/// Whether the id falls in the standard non-polar range `0..=14`.
#[must_use]
pub fn is_non_polar(id: i32) -> bool {
    id > -1 && id <= OTHER_NON_POLAR
}

/// Whether the id falls in the semi-standard non-polar range `15..=35`.
#[must_use]
pub fn is_semi_non_polar(id: i32) -> bool {
    id > OTHER_NON_POLAR && id <= OTHER_SEMI_NON_POLAR
}

/// One-hot encoding of the column id, length [`NUM_COLUMNS`]. Out-of-range
/// ids (including [`NO_COLUMN`]) yield the all-zero vector.
#[must_use]
pub fn one_hot(id: i32) -> Vec<f32> {
    let mut result = vec![0.0f32; NUM_COLUMNS];
    if id > -1 && (id as usize) < NUM_COLUMNS {
        result[id as usize] = 1.0;
    }
    result
}

/// Two-element polarity-class one-hot: `[1, 0]` for standard non-polar,
/// `[0, 1]` for semi-standard non-polar.
#[must_use]
pub fn polarity_one_hot(id: i32) -> Vec<f32> {
    vec![
        if is_non_polar(id) { 1.0 } else { 0.0 },
        if is_semi_non_polar(id) { 1.0 } else { 0.0 },
    ]
}

/// Concatenation of [`one_hot`] and [`polarity_one_hot`], length
/// `NUM_COLUMNS + 2`.
#[must_use]
pub fn one_hot_with_polarity(id: i32) -> Vec<f32> {
    let mut result = one_hot(id);
    result.extend(polarity_one_hot(id));
    result
}
