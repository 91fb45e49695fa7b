//! Seed the database with demo accounts and houses.
//!
//! Reads a YAML file (see `demos/seed.yaml`), validates it before touching
//! the database, then creates users, houses, members, stock items and
//! shopping entries through the server's repositories. Each created record
//! is written to the house's activity timeline. Users and houses that
//! already exist are skipped, so the command can be re-run.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};

use stock_home_core::{ActivityKind, Email, HouseName, MemberRole, UserId};
use stock_home_server::db::{
    ActivityRepository, HouseRepository, MembershipRepository, ProfileRepository,
    RepositoryError, ShoppingRepository, StockItemRepository, UserRepository,
};
use stock_home_server::models::{NewActivity, NewShoppingEntry, NewStockItem};
use stock_home_server::services::auth::AuthService;

/// Top-level seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub houses: Vec<SeedHouse>,
}

/// An account to create.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default = "default_verified")]
    pub verified: bool,
}

const fn default_verified() -> bool {
    true
}

/// A house with its members and contents.
#[derive(Debug, Deserialize)]
pub struct SeedHouse {
    pub name: String,
    /// Email of the owning user.
    pub owner: String,
    #[serde(default)]
    pub members: Vec<SeedMember>,
    #[serde(default)]
    pub items: Vec<NewStockItem>,
    #[serde(default)]
    pub shopping: Vec<SeedShopping>,
}

/// A member invited into a seeded house.
#[derive(Debug, Deserialize)]
pub struct SeedMember {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

const fn default_role() -> MemberRole {
    MemberRole::Member
}

/// A shopping list entry, optionally added by someone other than the owner.
#[derive(Debug, Deserialize)]
pub struct SeedShopping {
    #[serde(flatten)]
    pub entry: NewShoppingEntry,
    #[serde(default)]
    pub added_by: Option<String>,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub users_created: usize,
    pub users_skipped: usize,
    pub houses_created: usize,
    pub houses_skipped: usize,
    pub items: usize,
    pub shopping: usize,
    pub members: usize,
}

/// Check a seed file for problems that would fail halfway through a run.
///
/// Every referenced email must belong to a user declared in the file, and
/// each account joins a house at most once, counting the owner.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut emails = HashSet::new();

    for user in &seed.users {
        match Email::parse(&user.email) {
            Ok(email) => {
                if !emails.insert(email.as_str().to_owned()) {
                    errors.push(format!("duplicate user: {}", user.email));
                }
            }
            Err(e) => errors.push(format!("user {}: {e}", user.email)),
        }
        if user.name.trim().is_empty() {
            errors.push(format!("user {}: name is empty", user.email));
        }
    }

    let known = |email: &str| {
        Email::parse(email)
            .map(|e| emails.contains(e.as_str()))
            .unwrap_or(false)
    };

    let mut houses = HashSet::new();
    for house in &seed.houses {
        if let Err(e) = HouseName::parse(&house.name) {
            errors.push(format!("house {}: {e}", house.name));
        }
        if !houses.insert((house.owner.to_lowercase(), house.name.trim().to_owned())) {
            errors.push(format!("duplicate house: {}", house.name));
        }
        if !known(&house.owner) {
            errors.push(format!("house {}: unknown owner {}", house.name, house.owner));
        }
        let mut seen = HashSet::from([house.owner.trim().to_lowercase()]);
        for member in &house.members {
            if !known(&member.email) {
                errors.push(format!("house {}: unknown member {}", house.name, member.email));
            }
            if !seen.insert(member.email.trim().to_lowercase()) {
                errors.push(format!(
                    "house {}: {} is listed more than once (owners are members already)",
                    house.name, member.email
                ));
            }
        }
        for item in &house.items {
            if item.quantity.is_sign_negative() || item.minimum.is_sign_negative() {
                errors.push(format!("house {}: item {} has a negative amount", house.name, item.name));
            }
        }
        for entry in &house.shopping {
            if let Some(by) = &entry.added_by
                && !known(by)
            {
                errors.push(format!("house {}: unknown shopper {by}", house.name));
            }
        }
    }

    errors
}

/// Seed from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, or a database
/// operation fails.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(users = seed.users.len(), houses = seed.houses.len(), "Parsed seed file");

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let result = seed_all(&pool, &seed).await?;

    info!("Seeding complete!");
    info!("  Users created: {} (skipped {})", result.users_created, result.users_skipped);
    info!("  Houses created: {} (skipped {})", result.houses_created, result.houses_skipped);
    info!("  Members added: {}", result.members);
    info!("  Stock items: {}", result.items);
    info!("  Shopping entries: {}", result.shopping);

    Ok(())
}

/// A seeded or pre-existing account, keyed by lowercase email.
struct Account {
    id: UserId,
    name: String,
}

async fn seed_all(pool: &PgPool, seed: &SeedFile) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let mut result = SeedResult::default();
    let mut accounts: HashMap<String, Account> = HashMap::new();

    let users = UserRepository::new(pool);
    let profiles = ProfileRepository::new(pool);
    let auth = AuthService::new(pool);

    for seed_user in &seed.users {
        let email = Email::parse(&seed_user.email)?;

        let account = if let Some(existing) = users.get_by_email(&email).await? {
            result.users_skipped += 1;
            let name = profiles
                .get(existing.id)
                .await?
                .map_or_else(|| seed_user.name.clone(), |p| p.display_name);
            Account { id: existing.id, name }
        } else {
            let user = auth
                .sign_up(email.as_str(), &seed_user.password, &seed_user.name)
                .await
                .map_err(|e| format!("user {}: {}", seed_user.email, e.user_message()))?;
            if seed_user.verified {
                users.verify_email(&user.email).await?;
            }
            result.users_created += 1;
            info!(email = %user.email, "Created user");
            Account {
                id: user.id,
                name: seed_user.name.trim().to_owned(),
            }
        };

        accounts.insert(email.as_str().to_owned(), account);
    }

    for house in &seed.houses {
        seed_house(pool, house, &accounts, &mut result).await?;
    }

    Ok(result)
}

fn account<'a>(accounts: &'a HashMap<String, Account>, email: &str) -> Result<&'a Account, String> {
    let key = Email::parse(email).map_err(|e| e.to_string())?;
    accounts
        .get(key.as_str())
        .ok_or_else(|| format!("unknown user {email}"))
}

async fn seed_house(
    pool: &PgPool,
    house: &SeedHouse,
    accounts: &HashMap<String, Account>,
    result: &mut SeedResult,
) -> Result<(), Box<dyn std::error::Error>> {
    let owner = account(accounts, &house.owner)?;
    let name = HouseName::parse(&house.name)?;

    let created = match HouseRepository::new(pool).create(owner.id, &name).await {
        Ok(created) => created,
        Err(RepositoryError::Conflict(_)) => {
            warn!(house = %name, owner = %house.owner, "House already exists, skipping");
            result.houses_skipped += 1;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    result.houses_created += 1;
    info!(house = %name, house_id = %created.id, "Created house");

    let activity = ActivityRepository::new(pool);
    let memberships = MembershipRepository::new(pool);
    let stock = StockItemRepository::new(pool);
    let shopping = ShoppingRepository::new(pool);

    for seed_member in &house.members {
        let user = account(accounts, &seed_member.email)?;
        let member = memberships.add(created.id, user.id, seed_member.role).await?;
        activity
            .append(
                created.id,
                &NewActivity::by(
                    owner.id,
                    &owner.name,
                    ActivityKind::JoinMember,
                    &member.display_name,
                    format!("Bergabung sebagai {}", member.role.label()),
                ),
            )
            .await?;
        result.members += 1;
    }

    for new_item in &house.items {
        let item = stock.create(created.id, new_item).await?;
        activity
            .append(
                created.id,
                &NewActivity::by(
                    owner.id,
                    &owner.name,
                    ActivityKind::AddItem,
                    &item.name,
                    format!("Menambahkan {} {}", item.quantity.normalize(), item.unit),
                ),
            )
            .await?;
        result.items += 1;
    }

    for seed_entry in &house.shopping {
        let by = match &seed_entry.added_by {
            Some(email) => account(accounts, email)?,
            None => owner,
        };
        let entry = shopping.create(created.id, by.id, &seed_entry.entry).await?;
        activity
            .append(
                created.id,
                &NewActivity::by(
                    by.id,
                    &by.name,
                    ActivityKind::AddShopping,
                    &entry.name,
                    format!(
                        "Menambahkan {} {} ke daftar belanja",
                        entry.quantity.normalize(),
                        entry.unit
                    ),
                ),
            )
            .await?;
        result.shopping += 1;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stock_home_core::ShoppingPriority;

    use super::*;

    const SAMPLE: &str = r"
users:
  - email: rani@email.com
    name: Rani
    password: rahasia123
  - email: andi@email.com
    name: Andi
    password: rahasia123
    verified: false
houses:
  - name: Rumah A
    owner: rani@email.com
    members:
      - email: andi@email.com
    items:
      - name: Beras
        category: Makanan Pokok
        quantity: 2
        unit: kg
        minimum: 5
    shopping:
      - name: Gula
        category: Makanan Pokok
        quantity: 1
        unit: kg
        priority: high
        added_by: andi@email.com
";

    #[test]
    fn test_parse_sample() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(seed.users.len(), 2);
        assert!(seed.users[0].verified);
        assert!(!seed.users[1].verified);

        let house = &seed.houses[0];
        assert_eq!(house.members[0].role, MemberRole::Member);
        assert_eq!(house.items[0].minimum, "5".parse().unwrap());
        assert_eq!(house.shopping[0].entry.priority, ShoppingPriority::High);
        assert_eq!(house.shopping[0].added_by.as_deref(), Some("andi@email.com"));
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_unknown_references() {
        let mut seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        seed.houses[0].owner = "budi@email.com".to_owned();
        seed.houses[0].members[0].email = "sari@email.com".to_owned();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("unknown owner"));
        assert!(errors[1].contains("unknown member"));
    }

    #[test]
    fn test_validate_duplicates_and_bad_names() {
        let mut seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        seed.users[1].email = "RANI@email.com".to_owned();
        seed.houses[0].name = "   ".to_owned();

        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.starts_with("duplicate user")));
        assert!(errors.iter().any(|e| e.ends_with("house name cannot be empty")));
    }

    #[test]
    fn test_validate_repeated_members() {
        let mut seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        seed.houses[0].members.push(SeedMember {
            email: "Andi@Email.com".to_owned(),
            role: MemberRole::Moderator,
        });
        seed.houses[0].members.push(SeedMember {
            email: "rani@email.com".to_owned(),
            role: MemberRole::Member,
        });

        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Andi@Email.com is listed more than once"));
        assert!(errors[1].contains("rani@email.com is listed more than once"));
    }

    #[test]
    fn test_demo_seed_file_is_valid() {
        let content = include_str!("../../../../demos/seed.yaml");
        let seed: SeedFile = serde_yaml::from_str(content).unwrap();
        assert!(!seed.houses.is_empty());
        assert_eq!(validate(&seed), Vec::<String>::new());
    }
}
