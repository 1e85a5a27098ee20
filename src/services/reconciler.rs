use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::database::models::Player;
use crate::database::repositories::{MembershipRepository, PlayerRepository, TeamRepository};

/// Completes withdrawals whose cool-off has elapsed. Runs on a fixed
/// interval outside any request context; each player gets its own
/// transaction so one bad row never stalls the rest, and the status
/// compare-and-set means a cancel that slips in first simply wins.
#[derive(Clone)]
pub struct WithdrawalReconciler {
    pool: PgPool,
    player_repository: PlayerRepository,
    membership_repository: MembershipRepository,
    team_repository: TeamRepository,
    cooloff: Duration,
}

impl WithdrawalReconciler {
    pub fn new(
        pool: PgPool,
        player_repository: PlayerRepository,
        membership_repository: MembershipRepository,
        team_repository: TeamRepository,
        cooloff_hours: i64,
    ) -> Self {
        Self {
            pool,
            player_repository,
            membership_repository,
            team_repository,
            cooloff: Duration::hours(cooloff_hours),
        }
    }

    /// One sweep. Returns how many withdrawals were completed; already
    /// LEFT rows are excluded by the selection predicate, so running the
    /// sweep twice is a no-op.
    pub async fn run_sweep(&self) -> u32 {
        let cutoff = Utc::now() - self.cooloff;

        let due = match self.player_repository.find_withdrawals_due(cutoff).await {
            Ok(due) => due,
            Err(err) => {
                log::error!("Withdrawal sweep could not load due players: {}", err);
                return 0;
            }
        };

        if due.is_empty() {
            return 0;
        }

        log::info!("Withdrawal sweep: {} player(s) past cool-off", due.len());

        let mut completed = 0;
        for player in due {
            match self.complete_one(&player).await {
                Ok(true) => completed += 1,
                Ok(false) => {
                    // Cancelled between selection and write; nothing to do.
                    log::debug!("Player {} no longer pending withdrawal", player.id);
                }
                Err(err) => {
                    log::error!(
                        "Failed to complete withdrawal of player {}: {}",
                        player.id,
                        err
                    );
                }
            }
        }

        if completed > 0 {
            log::info!("Withdrawal sweep completed {} withdrawal(s)", completed);
        }
        completed
    }

    /// Per-player transaction: status to LEFT (CAS), team history closed,
    /// athlete released.
    async fn complete_one(&self, player: &Player) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        if !self
            .player_repository
            .complete_withdrawal(&mut tx, player.id)
            .await?
        {
            return Ok(false);
        }

        self.team_repository
            .close_open_memberships(&mut tx, player.id, Utc::now())
            .await?;

        if let Some(athlete_id) = player.athlete_id {
            self.membership_repository
                .release_athlete(&mut tx, athlete_id)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Interval loop spawned at startup; never returns.
    pub async fn run_forever(self, interval_secs: u64) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_sweep().await;
        }
    }
}
