#[actix_web::main]
async fn main() -> std::io::Result<()> {
    docbot_server::run().await
}
