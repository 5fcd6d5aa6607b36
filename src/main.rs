use nlc_frontend::error::FrontendError;

#[tokio::main]
async fn main() -> Result<(), FrontendError> {
    nlc_frontend::app::run().await
}
