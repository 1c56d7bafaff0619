use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Static ISO 3166-1 reference set
// ---------------------------------------------------------------------------

/// ISO 3166-1 alpha-3 codes with their short English names.
const ISO_COUNTRIES: &[(&str, &str)] = &[
    ("ABW", "Aruba"), ("AFG", "Afghanistan"), ("AGO", "Angola"), ("AIA", "Anguilla"),
    ("ALA", "Åland Islands"), ("ALB", "Albania"), ("AND", "Andorra"),
    ("ARE", "United Arab Emirates"), ("ARG", "Argentina"), ("ARM", "Armenia"),
    ("ASM", "American Samoa"), ("ATA", "Antarctica"), ("ATF", "French Southern Territories"),
    ("ATG", "Antigua and Barbuda"), ("AUS", "Australia"), ("AUT", "Austria"),
    ("AZE", "Azerbaijan"), ("BDI", "Burundi"), ("BEL", "Belgium"), ("BEN", "Benin"),
    ("BES", "Bonaire, Sint Eustatius and Saba"), ("BFA", "Burkina Faso"),
    ("BGD", "Bangladesh"), ("BGR", "Bulgaria"), ("BHR", "Bahrain"), ("BHS", "Bahamas"),
    ("BIH", "Bosnia and Herzegovina"), ("BLM", "Saint Barthélemy"), ("BLR", "Belarus"),
    ("BLZ", "Belize"), ("BMU", "Bermuda"), ("BOL", "Bolivia, Plurinational State of"),
    ("BRA", "Brazil"), ("BRB", "Barbados"), ("BRN", "Brunei Darussalam"), ("BTN", "Bhutan"),
    ("BVT", "Bouvet Island"), ("BWA", "Botswana"), ("CAF", "Central African Republic"),
    ("CAN", "Canada"), ("CCK", "Cocos (Keeling) Islands"), ("CHE", "Switzerland"),
    ("CHL", "Chile"), ("CHN", "China"), ("CIV", "Côte d'Ivoire"), ("CMR", "Cameroon"),
    ("COD", "Congo, The Democratic Republic of the"), ("COG", "Congo"),
    ("COK", "Cook Islands"), ("COL", "Colombia"), ("COM", "Comoros"), ("CPV", "Cabo Verde"),
    ("CRI", "Costa Rica"), ("CUB", "Cuba"), ("CUW", "Curaçao"), ("CXR", "Christmas Island"),
    ("CYM", "Cayman Islands"), ("CYP", "Cyprus"), ("CZE", "Czechia"), ("DEU", "Germany"),
    ("DJI", "Djibouti"), ("DMA", "Dominica"), ("DNK", "Denmark"),
    ("DOM", "Dominican Republic"), ("DZA", "Algeria"), ("ECU", "Ecuador"), ("EGY", "Egypt"),
    ("ERI", "Eritrea"), ("ESH", "Western Sahara"), ("ESP", "Spain"), ("EST", "Estonia"),
    ("ETH", "Ethiopia"), ("FIN", "Finland"), ("FJI", "Fiji"),
    ("FLK", "Falkland Islands (Malvinas)"), ("FRA", "France"), ("FRO", "Faroe Islands"),
    ("FSM", "Micronesia, Federated States of"), ("GAB", "Gabon"), ("GBR", "United Kingdom"),
    ("GEO", "Georgia"), ("GGY", "Guernsey"), ("GHA", "Ghana"), ("GIB", "Gibraltar"),
    ("GIN", "Guinea"), ("GLP", "Guadeloupe"), ("GMB", "Gambia"), ("GNB", "Guinea-Bissau"),
    ("GNQ", "Equatorial Guinea"), ("GRC", "Greece"), ("GRD", "Grenada"),
    ("GRL", "Greenland"), ("GTM", "Guatemala"), ("GUF", "French Guiana"), ("GUM", "Guam"),
    ("GUY", "Guyana"), ("HKG", "Hong Kong"), ("HMD", "Heard Island and McDonald Islands"),
    ("HND", "Honduras"), ("HRV", "Croatia"), ("HTI", "Haiti"), ("HUN", "Hungary"),
    ("IDN", "Indonesia"), ("IMN", "Isle of Man"), ("IND", "India"),
    ("IOT", "British Indian Ocean Territory"), ("IRL", "Ireland"),
    ("IRN", "Iran, Islamic Republic of"), ("IRQ", "Iraq"), ("ISL", "Iceland"),
    ("ISR", "Israel"), ("ITA", "Italy"), ("JAM", "Jamaica"), ("JEY", "Jersey"),
    ("JOR", "Jordan"), ("JPN", "Japan"), ("KAZ", "Kazakhstan"), ("KEN", "Kenya"),
    ("KGZ", "Kyrgyzstan"), ("KHM", "Cambodia"), ("KIR", "Kiribati"),
    ("KNA", "Saint Kitts and Nevis"), ("KOR", "Korea, Republic of"), ("KWT", "Kuwait"),
    ("LAO", "Lao People's Democratic Republic"), ("LBN", "Lebanon"), ("LBR", "Liberia"),
    ("LBY", "Libya"), ("LCA", "Saint Lucia"), ("LIE", "Liechtenstein"),
    ("LKA", "Sri Lanka"), ("LSO", "Lesotho"), ("LTU", "Lithuania"), ("LUX", "Luxembourg"),
    ("LVA", "Latvia"), ("MAC", "Macao"), ("MAF", "Saint Martin (French part)"),
    ("MAR", "Morocco"), ("MCO", "Monaco"), ("MDA", "Moldova, Republic of"),
    ("MDG", "Madagascar"), ("MDV", "Maldives"), ("MEX", "Mexico"),
    ("MHL", "Marshall Islands"), ("MKD", "North Macedonia"), ("MLI", "Mali"),
    ("MLT", "Malta"), ("MMR", "Myanmar"), ("MNE", "Montenegro"), ("MNG", "Mongolia"),
    ("MNP", "Northern Mariana Islands"), ("MOZ", "Mozambique"), ("MRT", "Mauritania"),
    ("MSR", "Montserrat"), ("MTQ", "Martinique"), ("MUS", "Mauritius"), ("MWI", "Malawi"),
    ("MYS", "Malaysia"), ("MYT", "Mayotte"), ("NAM", "Namibia"), ("NCL", "New Caledonia"),
    ("NER", "Niger"), ("NFK", "Norfolk Island"), ("NGA", "Nigeria"), ("NIC", "Nicaragua"),
    ("NIU", "Niue"), ("NLD", "Netherlands"), ("NOR", "Norway"), ("NPL", "Nepal"),
    ("NRU", "Nauru"), ("NZL", "New Zealand"), ("OMN", "Oman"), ("PAK", "Pakistan"),
    ("PAN", "Panama"), ("PCN", "Pitcairn"), ("PER", "Peru"), ("PHL", "Philippines"),
    ("PLW", "Palau"), ("PNG", "Papua New Guinea"), ("POL", "Poland"),
    ("PRI", "Puerto Rico"), ("PRK", "Korea, Democratic People's Republic of"),
    ("PRT", "Portugal"), ("PRY", "Paraguay"), ("PSE", "Palestine, State of"),
    ("PYF", "French Polynesia"), ("QAT", "Qatar"), ("REU", "Réunion"), ("ROU", "Romania"),
    ("RUS", "Russian Federation"), ("RWA", "Rwanda"), ("SAU", "Saudi Arabia"),
    ("SDN", "Sudan"), ("SEN", "Senegal"), ("SGP", "Singapore"),
    ("SGS", "South Georgia and the South Sandwich Islands"),
    ("SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    ("SJM", "Svalbard and Jan Mayen"), ("SLB", "Solomon Islands"),
    ("SLE", "Sierra Leone"), ("SLV", "El Salvador"), ("SMR", "San Marino"),
    ("SOM", "Somalia"), ("SPM", "Saint Pierre and Miquelon"), ("SRB", "Serbia"),
    ("SSD", "South Sudan"), ("STP", "Sao Tome and Principe"), ("SUR", "Suriname"),
    ("SVK", "Slovakia"), ("SVN", "Slovenia"), ("SWE", "Sweden"), ("SWZ", "Eswatini"),
    ("SXM", "Sint Maarten (Dutch part)"), ("SYC", "Seychelles"),
    ("SYR", "Syrian Arab Republic"), ("TCA", "Turks and Caicos Islands"), ("TCD", "Chad"),
    ("TGO", "Togo"), ("THA", "Thailand"), ("TJK", "Tajikistan"), ("TKL", "Tokelau"),
    ("TKM", "Turkmenistan"), ("TLS", "Timor-Leste"), ("TON", "Tonga"),
    ("TTO", "Trinidad and Tobago"), ("TUN", "Tunisia"), ("TUR", "Türkiye"),
    ("TUV", "Tuvalu"), ("TWN", "Taiwan, Province of China"),
    ("TZA", "Tanzania, United Republic of"), ("UGA", "Uganda"), ("UKR", "Ukraine"),
    ("UMI", "United States Minor Outlying Islands"), ("URY", "Uruguay"),
    ("USA", "United States"), ("UZB", "Uzbekistan"), ("VAT", "Holy See (Vatican City State)"),
    ("VCT", "Saint Vincent and the Grenadines"), ("VEN", "Venezuela, Bolivarian Republic of"),
    ("VGB", "Virgin Islands, British"), ("VIR", "Virgin Islands, U.S."), ("VNM", "Viet Nam"),
    ("VUT", "Vanuatu"), ("WLF", "Wallis and Futuna"), ("WSM", "Samoa"), ("YEM", "Yemen"),
    ("ZAF", "South Africa"), ("ZMB", "Zambia"), ("ZWE", "Zimbabwe"),
];

// ---------------------------------------------------------------------------
// CountryResolver
// ---------------------------------------------------------------------------

/// Maps alpha-3 codes to display names and answers map-validity checks.
///
/// Name lookups are keyed by lowercase code (the source data stores codes in
/// lowercase), while the validity set holds the uppercase codes the map
/// widget is keyed by. Both lookups normalise their input.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    names: HashMap<String, &'static str>,
    valid: HashSet<&'static str>,
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryResolver {
    pub fn new() -> Self {
        let names = ISO_COUNTRIES
            .iter()
            .map(|(code, name)| (code.to_ascii_lowercase(), *name))
            .collect();
        let valid = ISO_COUNTRIES.iter().map(|(code, _)| *code).collect();
        CountryResolver { names, valid }
    }

    /// Human-readable name for `code`, or `code` itself when unknown.
    pub fn display_name(&self, code: &str) -> String {
        self.names
            .get(&code.to_ascii_lowercase())
            .map(|name| name.to_string())
            .unwrap_or_else(|| code.to_string())
    }

    /// Whether `code` is a canonical ISO alpha-3 code.
    pub fn is_valid_code(&self, code: &str) -> bool {
        self.valid.contains(code.to_ascii_uppercase().as_str())
    }

    /// Selector label: `"Name (code)"`.
    pub fn option_label(&self, code: &str) -> String {
        format!("{} ({code})", self.display_name(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_case_insensitive() {
        let r = CountryResolver::new();
        assert_eq!(r.display_name("usa"), "United States");
        assert_eq!(r.display_name("USA"), "United States");
        assert!(r.is_valid_code("gbr"));
        assert!(r.is_valid_code("GBR"));
    }

    #[test]
    fn unknown_codes_fall_back_and_are_invalid() {
        let r = CountryResolver::new();
        assert_eq!(r.display_name("xkx"), "xkx");
        assert_eq!(r.display_name("Unknown"), "Unknown");
        assert!(!r.is_valid_code("xkx"));
        assert!(!r.is_valid_code("Unknown"));
    }

    #[test]
    fn labels_embed_the_code() {
        let r = CountryResolver::new();
        assert_eq!(r.option_label("cck"), "Cocos (Keeling) Islands (cck)");
        assert_eq!(r.option_label("Unknown"), "Unknown (Unknown)");
    }

    #[test]
    fn reference_set_has_unique_codes() {
        let r = CountryResolver::new();
        assert_eq!(r.valid.len(), ISO_COUNTRIES.len());
        assert!(ISO_COUNTRIES.iter().all(|(c, _)| c.len() == 3));
    }
}
