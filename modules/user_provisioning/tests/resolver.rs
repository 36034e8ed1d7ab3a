use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use user_provisioning::domain::error::DomainError;
use user_provisioning::domain::naming::normalize;
use user_provisioning::domain::ports::{DirectoryError, LoginOracle};
use user_provisioning::domain::resolver::LoginResolver;
use user_provisioning::PersonName;

const DOMAIN: &str = "corp.test";

/// Oracle with a fixed set of taken logins and logins whose check fails.
#[derive(Default)]
struct ScriptedOracle {
    taken: HashSet<String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn taken<'a>(locals: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: locals.into_iter().map(full).collect(),
            ..Default::default()
        }
    }

    fn failing_on(mut self, local: &str) -> Self {
        self.failing.insert(full(local));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LoginOracle for ScriptedOracle {
    async fn login_exists(&self, full_login: &str) -> Result<bool, DirectoryError> {
        self.calls.lock().push(full_login.to_string());
        if self.failing.contains(full_login) {
            return Err(DirectoryError::unavailable("connection reset"));
        }
        Ok(self.taken.contains(full_login))
    }
}

fn full(local: &str) -> String {
    format!("{local}@{DOMAIN}")
}

fn resolver() -> LoginResolver {
    LoginResolver::new(DOMAIN)
}

fn maria() -> PersonName {
    PersonName::new("María", "González").with_surname2("López")
}

#[tokio::test]
async fn free_namespace_yields_first_candidate() {
    let oracle = ScriptedOracle::default();
    let name = PersonName::new("José", "Pérez")
        .with_secondary_given("Luis")
        .with_surname2("Ramírez");

    let identity = resolver().resolve(&name, &oracle).await.unwrap();

    assert_eq!(identity.local_part, "jose.perez");
    assert_eq!(identity.full_login, "jose.perez@corp.test");
    assert_eq!(oracle.calls(), vec!["jose.perez@corp.test"]);
}

#[tokio::test]
async fn taken_first_candidate_falls_to_second_surname() {
    let oracle = ScriptedOracle::taken(["maria.gonzalez"]);

    let identity = resolver().resolve(&maria(), &oracle).await.unwrap();

    assert_eq!(identity.local_part, "maria.lopez");
    assert_eq!(identity.full_login, "maria.lopez@corp.test");
    assert_eq!(
        oracle.calls(),
        vec!["maria.gonzalez@corp.test", "maria.lopez@corp.test"]
    );
}

#[tokio::test]
async fn missing_second_surname_skips_to_secondary_given() {
    let oracle = ScriptedOracle::taken(["ana.ruiz"]);
    let name = PersonName::new("Ana", "Ruiz").with_secondary_given("Lucía");

    let identity = resolver().resolve(&name, &oracle).await.unwrap();

    assert_eq!(identity.local_part, "lucia.ruiz");
    assert_eq!(oracle.calls(), vec![full("ana.ruiz"), full("lucia.ruiz")]);
}

#[tokio::test]
async fn all_pairs_taken_uses_first_free_suffix() {
    let oracle = ScriptedOracle::taken([
        "maria.gonzalez",
        "maria.lopez",
        "jose.gonzalez",
        "jose.lopez",
        "maria.lopez.1",
        "maria.lopez.2",
    ]);
    let name = maria().with_secondary_given("José");

    let identity = resolver().resolve(&name, &oracle).await.unwrap();

    assert_eq!(identity.local_part, "maria.lopez.3");
    assert_eq!(oracle.calls().len(), 7);
}

#[tokio::test]
async fn suffix_base_without_second_surname_uses_first() {
    let oracle = ScriptedOracle::taken(["ana.ruiz"]);

    let identity = resolver()
        .resolve(&PersonName::new("Ana", "Ruiz"), &oracle)
        .await
        .unwrap();

    assert_eq!(identity.local_part, "ana.ruiz.1");
}

#[tokio::test]
async fn hundred_taken_suffixes_exhaust_the_search() {
    let suffixed: Vec<String> = (1..=100).map(|n| format!("ana.ruiz.{n}")).collect();
    let oracle = ScriptedOracle::taken(
        std::iter::once("ana.ruiz").chain(suffixed.iter().map(String::as_str)),
    );

    let err = resolver()
        .resolve(&PersonName::new("Ana", "Ruiz"), &oracle)
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::exhausted_suffix_space("ana.ruiz", 100));
    // one pair candidate, then exactly 100 suffixes
    assert_eq!(oracle.calls().len(), 101);
    assert_eq!(oracle.calls().last().map(String::as_str), Some("ana.ruiz.100@corp.test"));
}

#[tokio::test]
async fn suffix_bound_is_configurable() {
    let oracle = ScriptedOracle::taken(["ana.ruiz", "ana.ruiz.1", "ana.ruiz.2"]);

    let err = resolver()
        .with_max_suffix_attempts(2)
        .resolve(&PersonName::new("Ana", "Ruiz"), &oracle)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::ExhaustedSuffixSpace { attempts: 2, .. }));
}

#[tokio::test]
async fn failed_check_counts_as_available_without_retry() {
    let oracle = ScriptedOracle::taken(["maria.gonzalez"]).failing_on("maria.lopez");

    let identity = resolver().resolve(&maria(), &oracle).await.unwrap();

    assert_eq!(identity.local_part, "maria.lopez");
    assert_eq!(
        oracle
            .calls()
            .iter()
            .filter(|c| c.as_str() == "maria.lopez@corp.test")
            .count(),
        1
    );
}

#[tokio::test]
async fn unusable_required_parts_fail_before_any_lookup() {
    let oracle = ScriptedOracle::default();

    let err = resolver()
        .resolve(&PersonName::new("'-.", "Ruiz"), &oracle)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidName { .. }));

    let err = resolver()
        .resolve(&PersonName::new("Ana", "¡¿?!"), &oracle)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidName { .. }));

    assert!(oracle.calls().is_empty());
}

#[test]
fn normalization_examples() {
    assert_eq!(normalize("José"), "jose");
    assert_eq!(normalize("O'Neil-Pérez"), "oneilperez");
    assert_eq!(normalize(&normalize("O'Neil-Pérez")), "oneilperez");
}
