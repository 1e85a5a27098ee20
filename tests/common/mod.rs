use anyhow::Result;
use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use sqlx::PgPool;
use uuid::Uuid;

use rosterhub::config::Config;
use rosterhub::database::init_database;
use rosterhub::database::models::*;
use rosterhub::database::repositories::*;
use rosterhub::services::*;

/// Connects to the database named by TEST_DATABASE_URL and wipes the
/// lifecycle tables so every test starts from a clean slate. Tests using
/// this must run #[serial].
pub struct TestDb {
    pub pool: PgPool,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://@localhost:5432/rosterhub_test".to_string());
        let pool = init_database(&url).await?;

        sqlx::query(
            r#"
            TRUNCATE
                notifications,
                outbound_emails,
                absence_notices,
                injuries,
                training_attendance,
                trainings,
                team_memberships,
                transfer_requests,
                players,
                athletes,
                teams,
                users,
                guardians,
                clubs
            CASCADE
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(TestDb { pool })
    }
}

/// All services wired over one pool, mirroring the composition in main.
pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub athletes: AthleteRepository,
    pub players: PlayerRepository,
    pub membership: MembershipRepository,
    pub transfers_repo: TransferRequestRepository,
    pub trainings: TrainingRepository,
    pub attendance_repo: AttendanceRepository,
    pub notices_repo: AbsenceNoticeRepository,
    pub injuries: InjuryRepository,
    pub teams: TeamRepository,
    pub users: UserRepository,
    pub guardians: GuardianRepository,
    pub passport: PassportService,
    pub transfer: TransferService,
    pub withdrawal: WithdrawalService,
    pub attendance: AttendanceService,
    pub absence: AbsenceNoticeService,
    pub reconciler: WithdrawalReconciler,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let pool = db.pool.clone();

        let config = Config {
            database_url: String::new(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            client_base_url: "http://localhost:3000".to_string(),
            withdrawal_cooloff_hours: 24,
            reconciler_interval_secs: 3600,
            transfer_expiry_days: 7,
        };

        let athletes = AthleteRepository::new(pool.clone());
        let players = PlayerRepository::new(pool.clone());
        let membership = MembershipRepository::new(pool.clone());
        let transfers_repo = TransferRequestRepository::new(pool.clone());
        let trainings = TrainingRepository::new(pool.clone());
        let attendance_repo = AttendanceRepository::new(pool.clone());
        let notices_repo = AbsenceNoticeRepository::new(pool.clone());
        let injuries = InjuryRepository::new(pool.clone());
        let teams = TeamRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());
        let guardians = GuardianRepository::new(pool.clone());
        let notifier = NotificationService::new(NotificationRepository::new(pool.clone()));
        let mailer = MailerService::new(MailOutboxRepository::new(pool.clone()));

        let passport = PassportService::new(athletes.clone());
        let transfer = TransferService::new(
            pool.clone(),
            athletes.clone(),
            transfers_repo.clone(),
            membership.clone(),
            players.clone(),
            users.clone(),
            guardians.clone(),
            config.clone(),
        );
        let withdrawal = WithdrawalService::new(
            pool.clone(),
            athletes.clone(),
            players.clone(),
            membership.clone(),
            teams.clone(),
            users.clone(),
            notifier.clone(),
            mailer.clone(),
        );
        let attendance = AttendanceService::new(
            pool.clone(),
            trainings.clone(),
            attendance_repo.clone(),
            players.clone(),
        );
        let absence = AbsenceNoticeService::new(
            pool.clone(),
            notices_repo.clone(),
            trainings.clone(),
            athletes.clone(),
            players.clone(),
            attendance_repo.clone(),
            injuries.clone(),
            teams.clone(),
            notifier.clone(),
        );
        let reconciler = WithdrawalReconciler::new(
            pool.clone(),
            players.clone(),
            membership.clone(),
            teams.clone(),
            config.withdrawal_cooloff_hours,
        );

        Ok(TestContext {
            db,
            config,
            athletes,
            players,
            membership,
            transfers_repo,
            trainings,
            attendance_repo,
            notices_repo,
            injuries,
            teams,
            users,
            guardians,
            passport,
            transfer,
            withdrawal,
            attendance,
            absence,
            reconciler,
        })
    }

    pub async fn create_club(&self) -> Result<Uuid> {
        let id: (Uuid,) = sqlx::query_as(
            "INSERT INTO clubs (name, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(format!("FC {}", LastName().fake::<String>()))
        .bind(Some(SafeEmail().fake::<String>()))
        .fetch_one(&self.db.pool)
        .await?;
        Ok(id.0)
    }

    pub async fn create_staff(&self, club_id: Uuid, role: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (club_id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, club_id, guardian_id, email, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(club_id)
        .bind(SafeEmail().fake::<String>())
        .bind(hash("password123", DEFAULT_COST)?)
        .bind(FirstName().fake::<String>())
        .bind(role)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(user)
    }

    pub async fn create_guardian(&self) -> Result<Guardian> {
        let guardian = self
            .guardians
            .create(
                &SafeEmail().fake::<String>(),
                &hash("password123", DEFAULT_COST)?,
                &format!(
                    "{} {}",
                    FirstName().fake::<String>(),
                    LastName().fake::<String>()
                ),
                None,
            )
            .await?;
        Ok(guardian)
    }

    pub async fn create_athlete(&self, guardian_id: Uuid) -> Result<Athlete> {
        let athlete = self
            .passport
            .create_passport(
                guardian_id,
                CreateAthleteInput {
                    first_name: FirstName().fake(),
                    last_name: LastName().fake(),
                    birth_date: NaiveDate::from_ymd_opt(2014, 6, 15).unwrap(),
                    national_id: None,
                    national_id_country: None,
                    medical_notes: None,
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(athlete)
    }

    pub async fn create_team(&self, club_id: Uuid, head_coach: Option<Uuid>) -> Result<Uuid> {
        let id: (Uuid,) = sqlx::query_as(
            "INSERT INTO teams (club_id, name, head_coach_user_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(club_id)
        .bind("U12")
        .bind(head_coach)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(id.0)
    }

    pub async fn create_training(
        &self,
        club_id: Uuid,
        team_id: Uuid,
        session_date: NaiveDate,
        end_time: &str,
    ) -> Result<Uuid> {
        let id: (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO trainings (club_id, team_id, session_date, start_time, end_time)
            VALUES ($1, $2, $3, '17:00:00', $4::time)
            RETURNING id
            "#,
        )
        .bind(club_id)
        .bind(team_id)
        .bind(session_date)
        .bind(end_time)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(id.0)
    }

    pub async fn assign_player_to_team(&self, player_id: Uuid, team_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE players SET team_id = $1 WHERE id = $2")
            .bind(team_id)
            .bind(player_id)
            .execute(&self.db.pool)
            .await?;
        sqlx::query("INSERT INTO team_memberships (team_id, player_id) VALUES ($1, $2)")
            .bind(team_id)
            .bind(player_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    /// Rewind a pending withdrawal so the reconciler sees it as older.
    pub async fn age_withdrawal(&self, player_id: Uuid, requested_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE players SET withdrawal_requested_at = $1 WHERE id = $2")
            .bind(requested_at)
            .bind(player_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    /// Backdate a transfer request past its expiry.
    pub async fn expire_transfer_request(&self, request_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE transfer_requests SET expires_at = $1 WHERE id = $2")
            .bind(Utc::now() - Duration::minutes(1))
            .bind(request_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    /// A bound player created through the real transfer flow.
    pub async fn enroll_athlete(
        &self,
        club_id: Uuid,
        guardian: &Guardian,
        athlete: &Athlete,
    ) -> Result<Player> {
        let request = self
            .transfer
            .request_transfer(club_id, &athlete.passport_code)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let player = self
            .transfer
            .approve_transfer(guardian.id, request.id)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(player)
    }
}
