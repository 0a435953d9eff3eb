use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

use pico_s3::{Client, Credentials};

fn main() -> Result<(), pico_s3::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint = match env::var("S3_TEST_ENDPOINT") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Set S3_TEST_ENDPOINT to run this example (e.g. http://127.0.0.1:9000).");
            return Ok(());
        }
    };

    let bucket = match env::var("S3_TEST_BUCKET") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Set S3_TEST_BUCKET to a bucket you can write to.");
            return Ok(());
        }
    };

    let credentials = match Credentials::from_env() {
        Ok(v) => v,
        Err(err) => {
            eprintln!("Set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY: {err}");
            return Ok(());
        }
    };

    let client = Client::builder(&endpoint)?
        .credentials(credentials)
        .build()?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let key = format!("pico-s3-demo/{now}.txt");

    let put = client
        .objects()
        .put(&bucket, &key)
        .content_type("text/plain")
        .body_bytes(format!("written at {now}"))
        .send()?;
    println!("put {key} etag={:?}", put.etag);

    match client.objects().get(&bucket, &key).send()? {
        Some(obj) => println!("get {key}: {}", obj.text()),
        None => println!("get {key}: not found"),
    }

    let deleted = client.objects().delete(&bucket, &key).send()?;
    println!("delete {key}: {deleted}");

    Ok(())
}
