//! Seed the database with demo customers, users and phones.
//!
//! Each customer gets a freshly generated API token. Only its hash is
//! stored, so the plain tokens are printed once at the end and cannot be
//! recovered later.

use bilemo_api::config::{AccessSettings, database_url_from_env};
use bilemo_api::db::{PgStore, create_pool};
use bilemo_api::models::{NewUser, Phone, PhoneDetails, User, UserProfile};
use bilemo_api::services::tokens::{TokenHasher, generate_token};
use bilemo_api::updater::PartialUpdater;
use bilemo_core::CustomerName;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "Jean", "Marie", "Luc", "Camille", "Hugo", "Chloe", "Louis", "Ines", "Jules", "Lea",
];
const SURNAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau",
];
const MAIL_DOMAINS: &[&str] = &["orange.fr", "free.fr", "laposte.net", "gmail.com"];
const COMPANIES: &[&str] = &["phonix", "mobilia", "telcom", "ondes", "reseau"];
const MODELS: &[&str] = &[
    "Aurora", "Zenith", "Nova", "Pulse", "Vertex", "Orbit", "Echo", "Prism", "Flux", "Quartz",
];
const COLORS: &[&str] = &["Black", "White", "Silver", "Blue", "Red", "Gold", "Green"];
const FEATURES: &[&str] = &[
    "OLED display",
    "dual camera",
    "all-day battery",
    "fast charging",
    "water resistance",
    "5G connectivity",
    "expandable storage",
];

/// Generated demo data, ready to insert.
struct Fixtures {
    customers: Vec<CustomerName>,
    phones: Vec<PhoneDetails>,
    /// Users with the index of their owner in `customers`.
    users: Vec<(usize, UserProfile)>,
}

fn pick<'a>(rng: &mut impl Rng, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn generate(customer_count: usize, phone_count: usize) -> Fixtures {
    let mut rng = rand::rng();

    let customers = (0..customer_count)
        .map(|i| CustomerName::new(format!("{}{}", pick(&mut rng, COMPANIES), i + 1)))
        .collect();

    let phones = (0..phone_count)
        .map(|_| PhoneDetails {
            name: format!("{} {}", pick(&mut rng, MODELS), rng.random_range(1..=15)),
            color: pick(&mut rng, COLORS).to_owned(),
            price: rng.random_range(400..=1300),
            description: format!(
                "Features {} and {}.",
                pick(&mut rng, FEATURES),
                pick(&mut rng, FEATURES)
            ),
        })
        .collect();

    let user_count = rng.random_range(25..=31);
    let users = if customer_count == 0 {
        Vec::new()
    } else {
        (0..user_count)
            .map(|i| {
                let name = pick(&mut rng, FIRST_NAMES);
                let surname = pick(&mut rng, SURNAMES);
                let username = format!("{}{}{i}", name.to_lowercase(), surname.to_lowercase());
                let email = format!("{username}@{}", pick(&mut rng, MAIL_DOMAINS));
                let owner = rng.random_range(0..customer_count);
                (
                    owner,
                    UserProfile {
                        username,
                        name: name.to_owned(),
                        surname: surname.to_owned(),
                        email,
                    },
                )
            })
            .collect()
    };

    Fixtures {
        customers,
        phones,
        users,
    }
}

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if configuration is missing, a fixture fails validation
/// or a database operation fails.
pub async fn run(customer_count: usize, phone_count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let settings = AccessSettings::from_env()?;
    let hasher = TokenHasher::new(&settings.token_pepper)?;
    let pool = create_pool(&database_url_from_env()?).await?;
    let store = PgStore::new(pool);
    let updater = PartialUpdater::new(&store);

    let fixtures = generate(customer_count, phone_count);

    let mut credentials = Vec::with_capacity(fixtures.customers.len());
    for name in &fixtures.customers {
        let token = generate_token();
        store.create_customer(name, &hasher.hash(&token)).await?;
        credentials.push((name.clone(), token));
    }
    info!(count = credentials.len(), "Customers created");

    for draft in fixtures.phones {
        updater.create::<Phone>(draft).await?;
    }
    info!(count = phone_count, "Phones created");

    let user_count = fixtures.users.len();
    for (owner, profile) in fixtures.users {
        let Some(customer) = fixtures.customers.get(owner) else {
            continue;
        };
        updater
            .create::<User>(NewUser {
                customer: customer.clone(),
                profile,
            })
            .await?;
    }
    info!(count = user_count, "Users created");

    #[allow(clippy::print_stdout)]
    {
        println!("API tokens (shown once):");
        for (name, token) in &credentials {
            println!("  {name}: {token}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use bilemo_api::validation::Validate;

    use super::*;

    #[test]
    fn test_generated_fixtures_are_valid() {
        let fixtures = generate(3, 31);

        assert_eq!(fixtures.customers.len(), 3);
        assert_eq!(fixtures.phones.len(), 31);
        assert!((25..=31).contains(&fixtures.users.len()));

        for phone in &fixtures.phones {
            assert!(phone.validate().is_empty(), "{phone:?}");
        }
        for (owner, profile) in &fixtures.users {
            assert!(*owner < 3);
            assert!(profile.validate().is_empty(), "{profile:?}");
        }
    }

    #[test]
    fn test_customer_names_are_unique() {
        let fixtures = generate(5, 0);
        let mut names: Vec<_> = fixtures.customers.iter().map(CustomerName::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_no_customers_means_no_users() {
        assert!(generate(0, 2).users.is_empty());
    }
}
