//! Twitter Tweet Posting Script
//!
//! This script posts a single tweet using the OAuth 1.0a credentials from the
//! environment (`xapi_consumer_key`, `xapi_consumer_secret`, `xapi_access_token`,
//! `xapi_access_token_secret`) and the message typed on stdin. It goes through the
//! same signing and response handling as the `/post-to-twitter` endpoint.

use std::io::{self, Write};

use postcraft::twitter::{strip_line_ending, MAX_TWEET_CHARS};
use postcraft::{enforce_length, post_tweet, AppConfig, AppError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🐦 Twitter Tweet Posting Tool");
    println!("==============================");

    let config = AppConfig::from_env();
    if let Err(e) = config.twitter.credentials() {
        println!("❌ Twitter credentials are incomplete: {}", e);
        return Err(e.into());
    }

    // Get tweet message from user
    print!("📝 Enter your tweet message: ");
    io::stdout().flush()?;
    let mut tweet_text = String::new();
    io::stdin().read_line(&mut tweet_text)?;
    let tweet_text = strip_line_ending(&tweet_text);

    if tweet_text.trim().is_empty() {
        println!("❌ Tweet message cannot be empty!");
        return Err("Tweet message is required".into());
    }

    let length = tweet_text.chars().count();
    if length > MAX_TWEET_CHARS {
        println!(
            "✂️  Tweet is {} characters (max {}), it will be sent as:\n{}",
            length,
            MAX_TWEET_CHARS,
            enforce_length(tweet_text)
        );
    } else {
        println!("📏 Tweet length: {} characters", length);
    }

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    println!("\n🚀 Posting your tweet...");
    match post_tweet(&client, &config.twitter, tweet_text).await {
        Ok(tweet) => {
            println!("\n🎉 Success! Your tweet has been posted.");
            println!("🔗 {}", tweet.url);
            Ok(())
        }
        Err(AppError::UpstreamRejection { status, message }) => {
            println!("\n💥 Twitter rejected the tweet ({}): {}", status, message);
            Err(message.into())
        }
        Err(e) => {
            println!("\n💥 Failed to post tweet: {}", e);
            Err(e.into())
        }
    }
}
