use nutriaura_client::utils::media_type_for_path;
use nutriaura_client::{
    AnalysisClient, CapturedImage, QuizAnswers, config::Config, http_client::ReqwestAnalysisClient,
};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects NUTRIAURA_API_KEY in env and an image path argument
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: analyze_selfie <image>");
        return Ok(());
    };
    let image = CapturedImage::new(media_type_for_path(&path), std::fs::read(&path)?);
    let client = ReqwestAnalysisClient::from_config(&cfg)?;
    let result = client.analyze(&image, &QuizAnswers::default(), None).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
