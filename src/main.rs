#[actix_web::main]
async fn main() -> std::io::Result<()> {
    snextract_lib::run().await
}
