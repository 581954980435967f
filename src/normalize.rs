use serde_json::Value;
use std::collections::HashSet;

use crate::models::{NormalizedPair, Owner, RawRepository, Repo, RepoStatus};

/// Map raw repository records to deduplicated (owner, repo) pairs.
///
/// Pure and deterministic: the first occurrence of each `(repo.id, owner.id)`
/// key decides its position in the output, later duplicates are dropped.
/// Records that do not match the expected shape are skipped with a warning
/// rather than failing the batch.
pub fn normalize(raw: &[Value]) -> Vec<NormalizedPair> {
    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut pairs = Vec::new();

    for record in raw {
        let repo: RawRepository = match serde_json::from_value(record.clone()) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed repository record");
                continue;
            }
        };

        let key = (repo.id, repo.owner.id);
        if !seen.insert(key) {
            continue;
        }

        pairs.push(NormalizedPair {
            owner: Owner {
                id: repo.owner.id,
                name: repo.owner.login,
                email: repo.owner.email.unwrap_or_default(),
            },
            repo: Repo {
                id: repo.id,
                name: repo.name,
                status: if repo.private {
                    RepoStatus::Private
                } else {
                    RepoStatus::Public
                },
                stars_count: repo.stargazers_count,
                owner_id: key.1,
            },
        });
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_repo(id: i64, name: &str, private: bool, stars: u32, owner_id: i64) -> Value {
        json!({
            "id": id,
            "name": name,
            "private": private,
            "stargazers_count": stars,
            "owner": {"id": owner_id, "login": format!("user{owner_id}"), "email": null},
        })
    }

    #[test]
    fn exact_duplicate_collapses_to_one_pair() {
        let record = json!({
            "id": 1,
            "name": "a",
            "private": false,
            "stargazers_count": 5,
            "owner": {"id": 10, "login": "u", "email": "u@x.com"},
        });

        let pairs = normalize(&[record.clone(), record]);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].repo.stars_count, 5);
        assert_eq!(pairs[0].repo.status, RepoStatus::Public);
        assert_eq!(pairs[0].owner.email, "u@x.com");
    }

    #[test]
    fn same_repo_id_under_different_owners_both_survive() {
        let pairs = normalize(&[
            raw_repo(1, "fork", false, 0, 10),
            raw_repo(1, "fork", false, 0, 20),
        ]);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].owner.id, 10);
        assert_eq!(pairs[1].owner.id, 20);
    }

    #[test]
    fn output_keys_are_unique() {
        let raw: Vec<Value> = (0..50)
            .map(|i| raw_repo(i % 7, "r", false, 0, i % 3))
            .collect();

        let pairs = normalize(&raw);

        let mut keys = HashSet::new();
        for pair in &pairs {
            assert!(keys.insert((pair.repo.id, pair.owner.id)), "duplicate key");
        }
    }

    #[test]
    fn first_occurrence_determines_order() {
        let pairs = normalize(&[
            raw_repo(3, "c", false, 0, 1),
            raw_repo(1, "a", false, 0, 1),
            raw_repo(3, "c", false, 0, 1),
            raw_repo(2, "b", false, 0, 1),
        ]);

        let ids: Vec<i64> = pairs.iter().map(|p| p.repo.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn normalizing_is_idempotent() {
        let raw = vec![
            raw_repo(1, "a", false, 3, 10),
            raw_repo(2, "b", true, 0, 10),
            raw_repo(1, "a", false, 3, 10),
        ];

        let once = normalize(&raw);
        let reconverted: Vec<Value> = once
            .iter()
            .map(|p| {
                json!({
                    "id": p.repo.id,
                    "name": p.repo.name,
                    "private": p.repo.status == RepoStatus::Private,
                    "stargazers_count": p.repo.stars_count,
                    "owner": {"id": p.owner.id, "login": p.owner.name, "email": p.owner.email},
                })
            })
            .collect();
        let twice = normalize(&reconverted);

        assert_eq!(once, twice);
    }

    #[test]
    fn status_derivation() {
        let pairs = normalize(&[
            raw_repo(1, "pub", false, 0, 10),
            raw_repo(2, "priv", true, 0, 10),
        ]);

        assert_eq!(pairs[0].repo.status, RepoStatus::Public);
        assert_eq!(pairs[1].repo.status, RepoStatus::Private);
    }

    #[test]
    fn non_boolean_private_flag_is_malformed_and_skipped() {
        let bad = json!({
            "id": 1,
            "name": "a",
            "private": "yes",
            "stargazers_count": 0,
            "owner": {"id": 10, "login": "u"},
        });

        let pairs = normalize(&[bad, raw_repo(2, "ok", false, 0, 10)]);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].repo.id, 2);
    }

    #[test]
    fn record_missing_owner_is_skipped_batch_continues() {
        let bad = json!({"id": 1, "name": "a", "private": false, "stargazers_count": 0});

        let pairs = normalize(&[bad, raw_repo(2, "ok", false, 0, 10)]);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].repo.id, 2);
    }

    #[test]
    fn missing_email_becomes_empty_string() {
        let no_email = json!({
            "id": 1,
            "name": "a",
            "private": false,
            "stargazers_count": 0,
            "owner": {"id": 10, "login": "u"},
        });

        let pairs = normalize(&[no_email]);

        assert_eq!(pairs[0].owner.email, "");
    }

    #[test]
    fn owner_id_invariant_holds() {
        let pairs = normalize(&[raw_repo(1, "a", false, 0, 10), raw_repo(2, "b", true, 1, 20)]);

        for pair in &pairs {
            assert_eq!(pair.repo.owner_id, pair.owner.id);
        }
    }
}
