//! Bet lifecycle engine: create, join, terminate, delete, list.
//!
//! Terminate and delete are the only operations touching both tables. The
//! two writes are independent and unconditional; users are written first so
//! that a failure between them leaves settlement-applied-but-not-marked as
//! the only inconsistent window. Winners and losers are always recomputed
//! from stored participants, so re-running the bet write after such a
//! failure does not double-apply counters.

use crate::errors::{Error, Result};
use crate::store::handlers::users::upsert_counters;
use crate::store::models::bets::{BetRow, Outcome, Participant, ProbationSubject, Stance};
use crate::store::models::users::UserRow;
use crate::store::repository::TableRepository;
use chrono::{SecondsFormat, Utc};
use rand::prelude::*;
use tracing::instrument;
use uuid::Uuid;

const INVITE_CODE_LEN: usize = 6;
const INVITE_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Result of terminating a bet.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub bet_id: String,
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub realized: bool,
}

pub struct Bets<'r> {
    repo: &'r TableRepository,
}

impl<'r> Bets<'r> {
    pub fn new(repo: &'r TableRepository) -> Self {
        Self { repo }
    }

    /// All bets, in table order. An absent table is an empty list.
    pub async fn list(&self) -> Result<Vec<BetRow>> {
        Ok(self.repo.read_table().await?)
    }

    /// Open a new bet with the owner as its first participant.
    #[instrument(skip(self, probation_detail), err)]
    pub async fn create(
        &self,
        owner_id: &str,
        subject: &str,
        outcome: Outcome,
        stance: Stance,
        probation_detail: Vec<ProbationSubject>,
    ) -> Result<BetRow> {
        if outcome == Outcome::Probation && probation_detail.is_empty() {
            return Err(Error::Validation {
                message: "a probation bet needs at least one subject/grade pair".to_string(),
            });
        }
        // The detail list is meaningful only for probation bets
        let probation_detail = match outcome {
            Outcome::Probation => probation_detail,
            _ => Vec::new(),
        };

        let mut rows: Vec<BetRow> = self.repo.read_table().await?;

        let bet = BetRow {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            subject: subject.to_string(),
            outcome,
            probation_detail,
            invite_code: generate_invite_code(),
            participants: vec![Participant {
                user_id: owner_id.to_string(),
                stance: Some(stance),
            }],
            created_at: now_timestamp(),
            terminated_at: None,
            realized: None,
        };

        rows.push(bet.clone());
        self.repo.write_table(&rows).await?;

        Ok(bet)
    }

    /// Record a user's stance on an open bet.
    ///
    /// Idempotent: repeated joins by the same user overwrite their stance
    /// and never duplicate the entry.
    #[instrument(skip(self), err)]
    pub async fn join(&self, bet_id: &str, user_id: &str, stance: Stance) -> Result<BetRow> {
        let mut rows: Vec<BetRow> = self.repo.read_table().await?;

        let bet = rows.iter_mut().find(|b| b.id == bet_id).ok_or_else(|| Error::NotFound {
            resource: "bet",
            id: bet_id.to_string(),
        })?;
        if !bet.is_open() {
            return Err(Error::Conflict {
                message: "bet already terminated".to_string(),
            });
        }

        bet.set_stance(user_id, stance);
        let joined = bet.clone();
        self.repo.write_table(&rows).await?;

        Ok(joined)
    }

    /// Settle an open bet: declare whether the outcome was realized, credit
    /// the winners, debit the losers, and mark the bet terminated.
    ///
    /// Only the owner or an admin may terminate. Succeeds at most once per
    /// bet; a second call fails with a conflict and changes nothing.
    #[instrument(skip(self), err)]
    pub async fn terminate(&self, acting_user_id: &str, bet_id: &str, realized: bool) -> Result<Settlement> {
        let mut bets: Vec<BetRow> = self.repo.read_table().await?;

        let idx = bets.iter().position(|b| b.id == bet_id).ok_or_else(|| Error::NotFound {
            resource: "bet",
            id: bet_id.to_string(),
        })?;
        if !bets[idx].is_open() {
            return Err(Error::Conflict {
                message: "bet already terminated".to_string(),
            });
        }

        let mut users: Vec<UserRow> = self.repo.read_table().await?;

        let is_admin = users.iter().any(|u| u.id == acting_user_id && u.is_admin);
        if bets[idx].owner_id != acting_user_id && !is_admin {
            return Err(Error::Forbidden {
                message: "only the owner or an admin can terminate a bet".to_string(),
            });
        }

        let (winners, losers) = bets[idx].settlement_partition(realized);
        for user_id in &winners {
            upsert_counters(&mut users, user_id, 1, 0);
        }
        for user_id in &losers {
            upsert_counters(&mut users, user_id, 0, 1);
        }

        // Users first; see module docs for the failure window between the writes
        self.repo.write_table(&users).await?;

        bets[idx].terminated_at = Some(now_timestamp());
        bets[idx].realized = Some(realized);
        self.repo.write_table(&bets).await?;

        Ok(Settlement {
            bet_id: bet_id.to_string(),
            winners,
            losers,
            realized,
        })
    }

    /// Remove a bet (admin only). A bet that was already settled has its
    /// counter effects reversed first, clamped so nothing goes negative.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, acting_user_id: &str, bet_id: &str) -> Result<()> {
        let mut users: Vec<UserRow> = self.repo.read_table().await?;

        let is_admin = users.iter().any(|u| u.id == acting_user_id && u.is_admin);
        if !is_admin {
            return Err(Error::Forbidden {
                message: "only an admin can delete a bet".to_string(),
            });
        }

        let mut bets: Vec<BetRow> = self.repo.read_table().await?;
        let target = bets
            .iter()
            .find(|b| b.id == bet_id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource: "bet",
                id: bet_id.to_string(),
            })?;

        if target.terminated_at.is_some()
            && let Some(realized) = target.realized
        {
            // Same partition the termination used, reversed
            let (winners, losers) = target.settlement_partition(realized);
            let mut changed = false;
            for user_id in &winners {
                changed |= upsert_counters(&mut users, user_id, -1, 0);
            }
            for user_id in &losers {
                changed |= upsert_counters(&mut users, user_id, 0, -1);
            }
            if changed {
                self.repo.write_table(&users).await?;
            }
        }

        bets.retain(|b| b.id != bet_id);
        self.repo.write_table(&bets).await?;

        Ok(())
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_CHARS[rng.random_range(0..INVITE_CODE_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::handlers::users::Users;
    use crate::store::repository::test_support::temp_repository;

    async fn seed_users(repo: &TableRepository) -> (UserRow, UserRow, UserRow) {
        let u1 = UserRow::new("u1".to_string(), "alice".to_string(), "p1".to_string());
        let u2 = UserRow::new("u2".to_string(), "bob".to_string(), "p2".to_string());
        let mut admin = UserRow::new("adm".to_string(), "root".to_string(), "p3".to_string());
        admin.is_admin = true;

        repo.write_table(&[u1.clone(), u2.clone(), admin.clone()]).await.unwrap();
        (u1, u2, admin)
    }

    #[tokio::test]
    async fn test_list_without_table_is_empty() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);
        assert!(bets.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_seeds_owner_participant() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);

        let bet = bets
            .create("u1", "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();

        assert_eq!(bet.owner_id, "u1");
        assert_eq!(bet.participants.len(), 1);
        assert_eq!(bet.participants[0].user_id, "u1");
        assert_eq!(bet.participants[0].stance, Some(Stance::For));
        assert!(bet.is_open());
        assert!(bet.realized.is_none());
        assert_eq!(bet.invite_code.len(), INVITE_CODE_LEN);

        // The first create also materializes the table
        let listed = bets.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, bet.id);
    }

    #[tokio::test]
    async fn test_create_probation_requires_detail() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);

        let err = bets
            .create("u1", "MRos", Outcome::Probation, Stance::For, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let detail = vec![ProbationSubject {
            subject_name: "math".to_string(),
            grade: 4,
        }];
        let bet = bets
            .create("u1", "MRos", Outcome::Probation, Stance::For, detail.clone())
            .await
            .unwrap();
        assert_eq!(bet.probation_detail, detail);
    }

    #[tokio::test]
    async fn test_create_discards_detail_for_other_outcomes() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);

        let bet = bets
            .create(
                "u1",
                "MRos",
                Outcome::Admission,
                Stance::For,
                vec![ProbationSubject {
                    subject_name: "math".to_string(),
                    grade: 4,
                }],
            )
            .await
            .unwrap();
        assert!(bet.probation_detail.is_empty());
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);

        let bet = bets
            .create("u1", "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();

        let joined = bets.join(&bet.id, "u2", Stance::Against).await.unwrap();
        assert_eq!(joined.participants.len(), 2);

        // Second join by the same user overwrites the stance, count stays
        let rejoined = bets.join(&bet.id, "u2", Stance::For).await.unwrap();
        assert_eq!(rejoined.participants.len(), 2);
        let u2 = rejoined.participants.iter().find(|p| p.user_id == "u2").unwrap();
        assert_eq!(u2.stance, Some(Stance::For));
    }

    #[tokio::test]
    async fn test_join_missing_bet() {
        let (repo, _dir) = temp_repository();
        let bets = Bets::new(&repo);

        let err = bets.join("nope", "u2", Stance::For).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_join_terminated_bet_conflicts() {
        let (repo, _dir) = temp_repository();
        seed_users(&repo).await;
        let bets = Bets::new(&repo);

        let bet = bets
            .create("u1", "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.terminate("u1", &bet.id, true).await.unwrap();

        let err = bets.join(&bet.id, "u2", Stance::Against).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_terminate_settles_counters() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, _) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.join(&bet.id, &u2.id, Stance::Against).await.unwrap();

        let settlement = bets.terminate(&u1.id, &bet.id, true).await.unwrap();
        assert_eq!(settlement.winners, vec![u1.id.clone()]);
        assert_eq!(settlement.losers, vec![u2.id.clone()]);
        assert!(settlement.realized);

        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        let bob = ledger.find_by_id(&u2.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (1, 0));
        assert_eq!((bob.wins, bob.losses), (0, 1));

        let stored = bets.list().await.unwrap();
        assert!(stored[0].terminated_at.is_some());
        assert_eq!(stored[0].realized, Some(true));
    }

    #[tokio::test]
    async fn test_terminate_unrealized_swaps_sides() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, _) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Probation, Stance::For, vec![ProbationSubject {
                subject_name: "latin".to_string(),
                grade: 5,
            }])
            .await
            .unwrap();
        bets.join(&bet.id, &u2.id, Stance::Against).await.unwrap();

        let settlement = bets.terminate(&u1.id, &bet.id, false).await.unwrap();
        assert_eq!(settlement.winners, vec![u2.id.clone()]);
        assert_eq!(settlement.losers, vec![u1.id.clone()]);

        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        let bob = ledger.find_by_id(&u2.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (0, 1));
        assert_eq!((bob.wins, bob.losses), (1, 0));
    }

    #[tokio::test]
    async fn test_terminate_is_exactly_once() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, _) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.join(&bet.id, &u2.id, Stance::Against).await.unwrap();
        bets.terminate(&u1.id, &bet.id, true).await.unwrap();

        let first_stored = bets.list().await.unwrap()[0].clone();

        let err = bets.terminate(&u1.id, &bet.id, false).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // Nothing moved on the failed second call
        let second_stored = bets.list().await.unwrap()[0].clone();
        assert_eq!(second_stored, first_stored);
        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (1, 0));
    }

    #[tokio::test]
    async fn test_terminate_authorization() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, admin) = seed_users(&repo).await;
        let bets = Bets::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();

        // A mere participant cannot settle
        let err = bets.terminate(&u2.id, &bet.id, true).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        // An admin who is not the owner can
        bets.terminate(&admin.id, &bet.id, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_terminate_skips_unknown_participants() {
        let (repo, _dir) = temp_repository();
        let (u1, _, _) = seed_users(&repo).await;
        let bets = Bets::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.join(&bet.id, "ghost", Stance::Against).await.unwrap();

        let settlement = bets.terminate(&u1.id, &bet.id, true).await.unwrap();
        // The unknown id still shows up in the partition; only the counter
        // update is skipped
        assert_eq!(settlement.losers, vec!["ghost".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let (repo, _dir) = temp_repository();
        let (u1, _, _) = seed_users(&repo).await;
        let bets = Bets::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();

        let err = bets.delete(&u1.id, &bet.id).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_delete_open_bet_leaves_counters_alone() {
        let (repo, _dir) = temp_repository();
        let (u1, _, admin) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.delete(&admin.id, &bet.id).await.unwrap();

        assert!(bets.list().await.unwrap().is_empty());
        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (0, 0));
    }

    #[tokio::test]
    async fn test_delete_terminated_bet_reverses_settlement() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, admin) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.join(&bet.id, &u2.id, Stance::Against).await.unwrap();
        bets.terminate(&u1.id, &bet.id, true).await.unwrap();

        bets.delete(&admin.id, &bet.id).await.unwrap();

        // Both back to their pre-termination values, bet gone from the list
        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        let bob = ledger.find_by_id(&u2.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (0, 0));
        assert_eq!((bob.wins, bob.losses), (0, 0));
        assert!(bets.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reversal_clamps_after_external_reset() {
        let (repo, _dir) = temp_repository();
        let (u1, u2, admin) = seed_users(&repo).await;
        let bets = Bets::new(&repo);
        let ledger = Users::new(&repo);

        let bet = bets
            .create(&u1.id, "MRos", Outcome::Admission, Stance::For, Vec::new())
            .await
            .unwrap();
        bets.join(&bet.id, &u2.id, Stance::Against).await.unwrap();
        bets.terminate(&u1.id, &bet.id, true).await.unwrap();

        // Counters zeroed between termination and deletion
        ledger.reset_all_counters().await.unwrap();
        bets.delete(&admin.id, &bet.id).await.unwrap();

        let alice = ledger.find_by_id(&u1.id).await.unwrap().unwrap();
        let bob = ledger.find_by_id(&u2.id).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (0, 0));
        assert_eq!((bob.wins, bob.losses), (0, 0));
    }

    #[tokio::test]
    async fn test_delete_missing_bet() {
        let (repo, _dir) = temp_repository();
        let (_, _, admin) = seed_users(&repo).await;
        let bets = Bets::new(&repo);

        let err = bets.delete(&admin.id, "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
