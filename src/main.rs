#[actix_web::main]
async fn main() -> std::io::Result<()> {
    student_report_service::run().await
}
