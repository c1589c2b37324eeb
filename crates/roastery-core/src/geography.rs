//! # Geography
//!
//! Static GCC destination table: countries, their states (governorates,
//! regions, emirates) and the cities in each state.
//!
//! The table is `&'static` data and never changes at runtime. Lookups are
//! case-insensitive; countries match by ISO code or by English or Arabic
//! name.

/// A country in the destination table.
#[derive(Debug, PartialEq, Eq)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code, as sent to the carrier.
    pub code: &'static str,
    pub name: &'static str,
    pub name_ar: &'static str,
    pub states: &'static [State],
}

/// A first-level subdivision of a country.
#[derive(Debug, PartialEq, Eq)]
pub struct State {
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

impl Country {
    /// Finds one of this country's states by name.
    pub fn state(&self, name: &str) -> Option<&'static State> {
        let name = name.trim();
        self.states
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn matches(&self, query: &str) -> bool {
        self.code.eq_ignore_ascii_case(query)
            || self.name.eq_ignore_ascii_case(query)
            || self.name_ar == query
    }
}

impl State {
    /// Finds a city of this state by name, returning the canonical spelling.
    pub fn city(&self, name: &str) -> Option<&'static str> {
        let name = name.trim();
        self.cities
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Looks up a country by code or name.
pub fn country(query: &str) -> Option<&'static Country> {
    let query = query.trim();
    COUNTRIES.iter().find(|c| c.matches(query))
}

/// Every country in the table, in display order.
pub fn countries() -> &'static [Country] {
    COUNTRIES
}

/// State names of a country; empty for an unknown country.
pub fn states_for(country_query: &str) -> Vec<&'static str> {
    country(country_query)
        .map(|c| c.states.iter().map(|s| s.name).collect())
        .unwrap_or_default()
}

/// City names of a state; empty when either lookup fails.
pub fn cities_for(country_query: &str, state: &str) -> Vec<&'static str> {
    country(country_query)
        .and_then(|c| c.state(state))
        .map(|s| s.cities.to_vec())
        .unwrap_or_default()
}

// =============================================================================
// Table
// =============================================================================

macro_rules! state {
    ($name:literal => [$($city:literal),+ $(,)?]) => {
        State { name: $name, cities: &[$($city),+] }
    };
}

static COUNTRIES: &[Country] = &[
    Country {
        code: "OM",
        name: "Oman",
        name_ar: "عمان",
        states: &[
            state!("Muscat" => ["Muscat", "Muttrah", "Bawshar", "Seeb", "Al Amarat", "Qurayyat"]),
            state!("Dhofar" => ["Salalah", "Taqah", "Mirbat", "Thumrait"]),
            state!("Musandam" => ["Khasab", "Bukha", "Dibba"]),
            state!("Al Buraimi" => ["Al Buraimi", "Mahdah"]),
            state!("Ad Dakhiliyah" => ["Nizwa", "Bahla", "Samail", "Izki", "Adam"]),
            state!("North Al Batinah" => ["Sohar", "Shinas", "Liwa", "Saham", "Al Khaburah", "Suwaiq"]),
            state!("South Al Batinah" => ["Rustaq", "Barka", "Al Musannah", "Nakhal"]),
            state!("South Ash Sharqiyah" => ["Sur", "Jalan Bani Bu Ali", "Al Kamil Wal Wafi"]),
            state!("North Ash Sharqiyah" => ["Ibra", "Al Mudaybi", "Bidiyah"]),
            state!("Ad Dhahirah" => ["Ibri", "Yanqul", "Dhank"]),
            state!("Al Wusta" => ["Haima", "Duqm", "Mahout"]),
        ],
    },
    Country {
        code: "SA",
        name: "Saudi Arabia",
        name_ar: "السعودية",
        states: &[
            state!("Riyadh" => ["Riyadh", "Al Kharj", "Ad Diriyah", "Al Majmaah"]),
            state!("Makkah" => ["Mecca", "Jeddah", "Taif", "Rabigh"]),
            state!("Madinah" => ["Medina", "Yanbu", "Al Ula"]),
            state!("Eastern Province" => ["Dammam", "Al Khobar", "Dhahran", "Al Ahsa", "Jubail", "Qatif", "Hafar Al Batin"]),
            state!("Qassim" => ["Buraidah", "Unaizah", "Ar Rass"]),
            state!("Asir" => ["Abha", "Khamis Mushait", "Bisha"]),
            state!("Tabuk" => ["Tabuk"]),
            state!("Hail" => ["Hail"]),
            state!("Jazan" => ["Jazan"]),
            state!("Najran" => ["Najran"]),
            state!("Al Bahah" => ["Al Bahah"]),
            state!("Al Jawf" => ["Sakaka"]),
            state!("Northern Borders" => ["Arar"]),
        ],
    },
    Country {
        code: "AE",
        name: "United Arab Emirates",
        name_ar: "الإمارات",
        states: &[
            state!("Abu Dhabi" => ["Abu Dhabi", "Al Ain", "Ruwais"]),
            state!("Dubai" => ["Dubai", "Hatta"]),
            state!("Sharjah" => ["Sharjah", "Khor Fakkan", "Kalba"]),
            state!("Ajman" => ["Ajman"]),
            state!("Umm Al Quwain" => ["Umm Al Quwain"]),
            state!("Ras Al Khaimah" => ["Ras Al Khaimah"]),
            state!("Fujairah" => ["Fujairah", "Dibba Al Fujairah"]),
        ],
    },
    Country {
        code: "KW",
        name: "Kuwait",
        name_ar: "الكويت",
        states: &[
            state!("Al Asimah" => ["Kuwait City"]),
            state!("Hawalli" => ["Hawalli", "Salmiya"]),
            state!("Farwaniya" => ["Farwaniya", "Jleeb Al Shuyoukh"]),
            state!("Ahmadi" => ["Ahmadi", "Fahaheel", "Mangaf"]),
            state!("Jahra" => ["Jahra"]),
            state!("Mubarak Al Kabeer" => ["Mubarak Al Kabeer", "Sabah Al Salem"]),
        ],
    },
    Country {
        code: "QA",
        name: "Qatar",
        name_ar: "قطر",
        states: &[
            state!("Doha" => ["Doha"]),
            state!("Al Rayyan" => ["Al Rayyan"]),
            state!("Al Wakrah" => ["Al Wakrah", "Mesaieed"]),
            state!("Al Khor" => ["Al Khor"]),
            state!("Al Shamal" => ["Madinat ash Shamal"]),
            state!("Umm Salal" => ["Umm Salal"]),
            state!("Al Daayen" => ["Lusail"]),
        ],
    },
    Country {
        code: "BH",
        name: "Bahrain",
        name_ar: "البحرين",
        states: &[
            state!("Capital" => ["Manama"]),
            state!("Muharraq" => ["Muharraq", "Hidd"]),
            state!("Northern" => ["Budaiya", "Hamad Town"]),
            state!("Southern" => ["Riffa", "Isa Town", "Awali"]),
        ],
    },
];
