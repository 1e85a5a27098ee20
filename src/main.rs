use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use rosterhub::database::{
    init_database,
    repositories::{
        AbsenceNoticeRepository, AthleteRepository, AttendanceRepository, GuardianRepository,
        InjuryRepository, MailOutboxRepository, MembershipRepository, NotificationRepository,
        PlayerRepository, TeamRepository, TrainingRepository, TransferRequestRepository,
        UserRepository,
    },
};
use rosterhub::handlers::{absences, athletes, auth, trainings, transfers, withdrawals};
use rosterhub::middleware::RequestId;
use rosterhub::services::{
    AbsenceNoticeService, AttendanceService, AuthService, MailerService, NotificationService,
    PassportService, TransferService, WithdrawalReconciler, WithdrawalService,
};
use rosterhub::{AppState, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("RosterHub API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories
    let athlete_repository = AthleteRepository::new(pool.clone());
    let player_repository = PlayerRepository::new(pool.clone());
    let membership_repository = MembershipRepository::new(pool.clone());
    let transfer_repository = TransferRequestRepository::new(pool.clone());
    let training_repository = TrainingRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());
    let absence_repository = AbsenceNoticeRepository::new(pool.clone());
    let injury_repository = InjuryRepository::new(pool.clone());
    let team_repository = TeamRepository::new(pool.clone());
    let user_repository = UserRepository::new(pool.clone());
    let guardian_repository = GuardianRepository::new(pool.clone());
    let notification_repository = NotificationRepository::new(pool.clone());
    let mail_repository = MailOutboxRepository::new(pool.clone());

    // Services
    let notifier = NotificationService::new(notification_repository);
    let mailer = MailerService::new(mail_repository);
    let auth_service = AuthService::new(
        config.clone(),
        user_repository.clone(),
        guardian_repository.clone(),
    );
    let passport_service = PassportService::new(athlete_repository.clone());
    let transfer_service = TransferService::new(
        pool.clone(),
        athlete_repository.clone(),
        transfer_repository.clone(),
        membership_repository.clone(),
        player_repository.clone(),
        user_repository.clone(),
        guardian_repository.clone(),
        config.clone(),
    );
    let withdrawal_service = WithdrawalService::new(
        pool.clone(),
        athlete_repository.clone(),
        player_repository.clone(),
        membership_repository.clone(),
        team_repository.clone(),
        user_repository.clone(),
        notifier.clone(),
        mailer.clone(),
    );
    let attendance_service = AttendanceService::new(
        pool.clone(),
        training_repository.clone(),
        attendance_repository.clone(),
        player_repository.clone(),
    );
    let absence_service = AbsenceNoticeService::new(
        pool.clone(),
        absence_repository.clone(),
        training_repository.clone(),
        athlete_repository.clone(),
        player_repository.clone(),
        attendance_repository.clone(),
        injury_repository.clone(),
        team_repository.clone(),
        notifier.clone(),
    );

    // The reconciler is the only actor outside the request cycle: an
    // hourly sweep completing withdrawals whose cool-off elapsed.
    let reconciler = WithdrawalReconciler::new(
        pool.clone(),
        player_repository.clone(),
        membership_repository.clone(),
        team_repository.clone(),
        config.withdrawal_cooloff_hours,
    );
    tokio::spawn(reconciler.run_forever(config.reconciler_interval_secs));

    let app_state = web::Data::new(AppState { auth_service });
    let passport_data = web::Data::new(passport_service);
    let transfer_data = web::Data::new(transfer_service);
    let transfer_repo_data = web::Data::new(transfer_repository);
    let withdrawal_data = web::Data::new(withdrawal_service);
    let attendance_data = web::Data::new(attendance_service);
    let absence_data = web::Data::new(absence_service);
    let absence_repo_data = web::Data::new(absence_repository);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(passport_data.clone())
            .app_data(transfer_data.clone())
            .app_data(transfer_repo_data.clone())
            .app_data(withdrawal_data.clone())
            .app_data(attendance_data.clone())
            .app_data(absence_data.clone())
            .app_data(absence_repo_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth").route("/login", web::post().to(auth::login)),
                    )
                    .service(
                        web::scope("/athletes")
                            .route("", web::post().to(athletes::create_athlete))
                            .route("", web::get().to(athletes::list_athletes))
                            .route("/{id}", web::get().to(athletes::get_athlete))
                            .route(
                                "/{id}/withdrawal",
                                web::post().to(withdrawals::request_withdrawal),
                            )
                            .route(
                                "/{id}/withdrawal",
                                web::delete().to(withdrawals::cancel_withdrawal),
                            ),
                    )
                    .service(
                        web::scope("/transfers")
                            .route("/search", web::get().to(transfers::search_athlete))
                            .route("", web::post().to(transfers::request_transfer))
                            .route("", web::get().to(transfers::list_transfer_requests))
                            .route("/{id}/approve", web::post().to(transfers::approve_transfer)),
                    )
                    .service(
                        web::scope("/players")
                            .route("/{id}/terminate", web::post().to(withdrawals::terminate_link)),
                    )
                    .service(
                        web::scope("/trainings")
                            .route(
                                "/{id}/attendance",
                                web::post().to(trainings::mark_attendance),
                            )
                            .route(
                                "/{id}/attendance",
                                web::get().to(trainings::list_attendance),
                            )
                            .route(
                                "/{id}/finalize",
                                web::post().to(trainings::finalize_training),
                            ),
                    )
                    .service(
                        web::scope("/absence-notices")
                            .route("", web::post().to(absences::submit_notice))
                            .route("", web::get().to(absences::list_notices))
                            .route("/{id}/approve", web::post().to(absences::approve_notice))
                            .route("/{id}/dismiss", web::post().to(absences::dismiss_notice)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
