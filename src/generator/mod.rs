//! Persona-based synthetic record source.
//!
//! Each customer is drawn from a hidden persona so income and spending
//! score are correlated and the clustering step has real structure to
//! find. The persona never leaves this module; downstream code only sees
//! the fixed record schema.

use crate::core::Storage;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_list, validate_path, validate_range, Validate};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::domain::model::CustomerRecord;

pub const DOMAINS: [&str; 5] = ["Clothing", "Tech", "Grocery", "Beauty", "Home"];

const DEFAULT_MALLS: &str = "Metro Plaza,Grand Central,Lakeside View,Ocean Breeze,Highland Park";
const DEFAULT_YEARS: &str = "2020,2021,2022,2023,2024";

#[derive(Debug, Clone, Parser)]
#[command(name = "generate_data")]
#[command(about = "Generates synthetic per-mall customer records")]
pub struct GeneratorConfig {
    /// Directory receiving one JSON file per mall
    #[arg(long, default_value = "./mall_data")]
    pub output_dir: String,

    #[arg(long, value_delimiter = ',', default_value = DEFAULT_MALLS)]
    pub malls: Vec<String>,

    #[arg(long, value_delimiter = ',', default_value = DEFAULT_YEARS)]
    pub years: Vec<u32>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_dir", &self.output_dir)?;
        validate_non_empty_list("malls", &self.malls)?;
        for &year in &self.years {
            validate_range("years", year, 1900, 2100)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Persona {
    SensibleSaver,   // low income, low score
    ImpulsiveSpender, // low income, high score
    Mainstream,      // mid income, mid score
    FrugalElite,     // high income, low score
    LuxuryTarget,    // high income, high score
}

fn seed_for(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn draw_persona(rng: &mut StdRng) -> Persona {
    // Most visitors are mainstream; the four corner personas split the rest.
    let roll: f64 = rng.gen();
    if roll < 0.15 {
        Persona::SensibleSaver
    } else if roll < 0.30 {
        Persona::ImpulsiveSpender
    } else if roll < 0.70 {
        Persona::Mainstream
    } else if roll < 0.85 {
        Persona::FrugalElite
    } else {
        Persona::LuxuryTarget
    }
}

fn income_and_score(persona: Persona, rng: &mut StdRng) -> (i64, i64) {
    match persona {
        Persona::SensibleSaver => (rng.gen_range(15..40), rng.gen_range(1..35)),
        Persona::ImpulsiveSpender => (rng.gen_range(15..40), rng.gen_range(60..99)),
        Persona::Mainstream => (rng.gen_range(45..75), rng.gen_range(35..65)),
        Persona::FrugalElite => (rng.gen_range(80..140), rng.gen_range(1..35)),
        Persona::LuxuryTarget => (rng.gen_range(80..140), rng.gen_range(65..99)),
    }
}

/// Dirichlet(1) over the spending domains: normalized unit exponentials.
fn domain_weights(rng: &mut StdRng) -> [f64; 5] {
    let mut weights = [0.0f64; 5];
    for w in &mut weights {
        let u: f64 = rng.gen();
        *w = (-(1.0 - u).ln()).max(f64::MIN_POSITIVE);
    }
    weights
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One reproducible customer: the rng is seeded from (mall, year, index),
/// so regenerating a dataset yields identical records.
pub fn generate_customer(mall: &str, year: u32, index: usize) -> CustomerRecord {
    let mut rng = StdRng::seed_from_u64(seed_for(&format!("{}_{}_{}", mall, year, index)));

    let gender = if rng.gen::<f64>() < 0.48 { "Male" } else { "Female" };
    let age: u32 = rng.gen_range(18..75);

    let persona = draw_persona(&mut rng);
    let (income, score) = income_and_score(persona, &mut rng);

    // Spending score is abstract (1-99); convert it to an estimated annual
    // spend of roughly 15% of proportional income.
    let base_budget = (income as f64 * 1000.0) * (score as f64 / 100.0) * 0.15;

    let mut weights = domain_weights(&mut rng);
    match gender {
        "Female" => {
            weights[3] *= 1.5; // Beauty
            weights[0] *= 1.2; // Clothing
        }
        _ => {
            weights[1] *= 1.6; // Tech
        }
    }
    if age < 30 {
        weights[1] *= 1.3;
    } else if age > 50 {
        weights[2] *= 1.4;
    }
    let weight_sum: f64 = weights.iter().sum();

    let mut expenses = BTreeMap::new();
    let mut total_spent_annual = 0.0;
    for (domain, weight) in DOMAINS.iter().zip(weights.iter()) {
        let amount = round2(base_budget * weight / weight_sum);
        expenses.insert((*domain).to_string(), amount);
        total_spent_annual += amount;
    }

    let prefix: String = mall.chars().take(3).collect::<String>().to_uppercase();

    CustomerRecord {
        customer_id: format!("{}-{}-{:04}", prefix, year, index),
        gender: gender.to_string(),
        age,
        annual_income_k: income,
        spending_score: score,
        expenses,
        total_spent_annual: round2(total_spent_annual),
    }
}

/// Visitor volume per group; 2020 runs low.
fn visitor_count(mall: &str, year: u32) -> usize {
    let mut rng = StdRng::seed_from_u64(seed_for(&format!("{}_{}", mall, year)));
    if year == 2020 {
        rng.gen_range(120..150)
    } else {
        rng.gen_range(180..250)
    }
}

pub fn generate_mall(mall: &str, years: &[u32]) -> BTreeMap<String, Vec<CustomerRecord>> {
    let mut mall_data = BTreeMap::new();
    for &year in years {
        let count = visitor_count(mall, year);
        let customers: Vec<CustomerRecord> = (0..count)
            .map(|i| generate_customer(mall, year, i))
            .collect();
        mall_data.insert(year.to_string(), customers);
    }
    mall_data
}

/// Writes one JSON file per configured mall and returns the file paths.
pub async fn generate<S: Storage>(config: &GeneratorConfig, storage: &S) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(config.malls.len());

    for mall in &config.malls {
        tracing::info!("Generating {}...", mall);
        let mall_data = generate_mall(mall, &config.years);
        let bytes = serde_json::to_vec_pretty(&mall_data)?;

        let filename = format!("{}.json", mall.replace(' ', "_"));
        let path = Path::new(&config.output_dir).join(&filename);
        let path = path.to_string_lossy().to_string();
        storage.write_file(&path, &bytes).await?;
        written.push(path);
    }

    Ok(written)
}
