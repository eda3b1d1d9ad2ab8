// Demo driver: lends power banks from a fixed box and from a growing pool.
// Set RUST_LOG=loanpool=debug to see growth and ignored returns.

use loanpool::{BOX_SLOTS, PoolConfiguration, PoolResult, SerialCounter, power_bank_box, power_bank_pool};
use tracing_subscriber::EnvFilter;

fn main() -> PoolResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loanpool=info")),
        )
        .init();

    println!("=== Power bank box ===");
    box_demo()?;

    println!();
    println!("=== Power bank pool ===");
    pool_demo()?;

    Ok(())
}

fn box_demo() -> PoolResult<()> {
    let bank_box = power_bank_box(PoolConfiguration::new().with_name("box"))?;
    let first = "0001".to_string();

    for (slot, user) in BOX_SLOTS.iter().zip(["Tony", "Sam"]) {
        if let Some(bank) = bank_box.try_borrow_object(&slot.to_string()) {
            bank.set_user(user);
            println!("  {bank}");
        }
    }

    if bank_box.try_borrow_object(&first).is_none() {
        println!("  {first} is already lent out");
    }
    bank_box.return_object(&first);

    if let Some(bank) = bank_box.try_borrow_object(&first) {
        bank.set_user("Aimee");
        println!("  {bank}");
    }
    Ok(())
}

fn pool_demo() -> PoolResult<()> {
    let config = PoolConfiguration::new()
        .with_name("power-banks")
        .with_initial_size(2)
        .with_max_size(3);
    let pool = power_bank_pool(config, SerialCounter::global())?;

    let tony = pool.borrow_object()?;
    tony.set_user("Tony");
    println!("  {tony}");

    let sam = pool.borrow_object()?;
    sam.set_user("Sam");
    println!("  {sam}");

    pool.return_object(&tony);
    let aimee = pool.borrow_object()?;
    aimee.set_user("Aimee");
    println!("  {aimee}");

    let health = pool.health_status();
    println!(
        "  busy: {}, free: {}, max: {}, healthy: {}",
        health.busy_entries, health.free_entries, health.max_size, health.is_healthy
    );
    Ok(())
}
