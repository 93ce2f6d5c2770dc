/// Display version information
pub fn execute() {
    println!("ballot-ledger {}", env!("CARGO_PKG_VERSION"));
    println!("Read-only proposal and winner queries for ballot contracts");
}
