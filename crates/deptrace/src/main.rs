#[tokio::main]
async fn main() {
    if let Err(e) = deptrace_lib::main().await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
