#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    certbot_dns_lambda_lib::run().await
}
