//! Basic Threads client usage example

use threads_client::ThreadsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize from environment
    let client = ThreadsClient::from_env()?;

    // Publish a text post
    println!("=== Publish ===");
    let published = client
        .post()
        .text("Hello Threads!")
        .topic_tag("rustlang")
        .build()?
        .publish()
        .await?;

    println!("Published post {}", published.id());

    // Like it, then reply to it
    println!("\n=== Interactions ===");
    let liked = published.like().await?;
    println!("Liked: {}", liked.success);

    let reply_draft = client.post().text("Replying to myself").build()?;
    let reply = published.reply(reply_draft).await?;
    println!(
        "Reply {} has parent {}",
        reply.id(),
        reply.parent().map(|p| p.id()).unwrap_or("<none>")
    );

    // Recent posts
    println!("\n=== Recent posts ===");
    let page = client.list_user_posts(None, 5, None).await?;
    for post in &page.posts {
        println!("{}: {}", post.id(), post.data().text.as_deref().unwrap_or(""));
    }

    Ok(())
}
