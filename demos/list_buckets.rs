use std::env;

use pico_s3::{Client, Credentials};

fn main() -> Result<(), pico_s3::Error> {
    let endpoint = match env::var("S3_TEST_ENDPOINT") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Set S3_TEST_ENDPOINT to run this example (e.g. http://127.0.0.1:9000).");
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
    println!("signing with {:?}", client.signature_version());

    for page in client.buckets().list().pager() {
        for name in page?.items {
            println!("{name}");
        }
    }

    Ok(())
}
