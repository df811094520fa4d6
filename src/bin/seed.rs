use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;

use teesheet::{
    domain::{CreateBookingRequest, CreateWaitlistRequest},
    repository::{
        BookingRepository, SqliteBookingRepository, SqliteWaitlistRepository, WaitlistRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the teesheet database with demo bookings and waitlist entries")]
struct Args {
    /// Number of extra random waitlist entries to generate
    #[arg(long, default_value_t = 8)]
    waitlist: usize,

    /// Database to seed (falls back to DATABASE_URL, then sqlite:teesheet.db)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:teesheet.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let waitlist_repo = SqliteWaitlistRepository::new(db_pool.clone());
    let booking_repo = SqliteBookingRepository::new(db_pool.clone());

    println!("⛳ Creating bookings...");

    let next_saturday = Utc::now().date_naive() + Duration::days(7);

    // A regular booking ready for a deposit request
    let alice = booking_repo
        .create(CreateBookingRequest {
            guest_email: "alice@example.com".to_string(),
            guest_name: "Alice Johnson".to_string(),
            date: next_saturday,
            tee_time: Some("10:20 AM".to_string()),
            players: 4,
            total_cents: 20_000,
            currency: "EUR".to_string(),
            club: "island".to_string(),
            is_tour_operator: false,
            deposit_percentage: None,
            note: Some("Requested a buggy for two players".to_string()),
        })
        .await?;

    // A tour operator booking (50% deposit)
    let operator = booking_repo
        .create(CreateBookingRequest {
            guest_email: "groups@fairwaytours.example".to_string(),
            guest_name: "Fairway Tours Ltd".to_string(),
            date: next_saturday + Duration::days(1),
            tee_time: Some("9:00 AM".to_string()),
            players: 12,
            total_cents: 50_000,
            currency: "EUR".to_string(),
            club: "island".to_string(),
            is_tour_operator: true,
            deposit_percentage: None,
            note: None,
        })
        .await?;

    println!(
        "  ✅ Created bookings {} and {} (tour operator)",
        alice.booking_ref, operator.booking_ref
    );

    println!("📝 Creating waitlist entries...");

    let mut created = 0usize;
    for i in 0..args.waitlist {
        let guest_name: String = Name().fake();
        let guest_email: String = SafeEmail().fake();
        let priority = rand::thread_rng().gen_range(1..=10);
        let offset = (i % 5) as i64;

        let request = CreateWaitlistRequest {
            guest_email,
            guest_name,
            requested_date: next_saturday + Duration::days(offset),
            preferred_time: "Flexible".to_string(),
            time_flexibility: "Flexible".to_string(),
            players: rand::thread_rng().gen_range(1..=4),
            golf_course: "The Island Golf Club".to_string(),
            club: "island".to_string(),
            priority,
            notes: None,
            source: "seed".to_string(),
            opt_in_confirmed: true,
            original_booking_request: None,
        };

        // Random guests can collide on the active-entry constraint; skip
        // those rather than abort the seed run.
        match waitlist_repo.create(request).await {
            Ok(_) => created += 1,
            Err(e) => println!("  ⚠️  Skipped one entry: {}", e),
        }
    }

    println!("  ✅ Created {} waitlist entries", created);
    println!("🎉 Seeding complete");

    Ok(())
}
