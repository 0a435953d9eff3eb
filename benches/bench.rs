use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pico_s3::{
    Credentials, SignatureVersion,
    signing::{Signer, SigningContext},
    xml::decode,
};
use time::OffsetDateTime;

fn signer(version: SignatureVersion) -> Signer {
    let creds = Credentials::new("AKIDEXAMPLE", "SECRETKEYEXAMPLE")
        .expect("static credentials must be valid")
        .with_region("us-east-1")
        .expect("static region must be valid");
    Signer::with_version(creds, version).expect("signer must build")
}

fn listing(entries: usize) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>bucket</Name>"#,
    );
    for i in 0..entries {
        body.push_str(&format!(
            "<Contents><Key>dir/object-{i:05}.bin</Key><LastModified>2013-05-24T00:00:00.000Z</LastModified><ETag>&quot;9b2cf535f27731c974343645a3985328&quot;</ETag><Size>{i}</Size><StorageClass>STANDARD</StorageClass></Contents>"
        ));
    }
    body.push_str("<IsTruncated>true</IsTruncated><NextContinuationToken>token</NextContinuationToken></ListBucketResult>");
    body
}

fn bench_signing(c: &mut Criterion) {
    let at = OffsetDateTime::from_unix_timestamp(1_369_353_600).expect("valid timestamp");
    let body = vec![0xAB; 4096];

    let mut group = c.benchmark_group("signing");
    group.measurement_time(Duration::from_secs(3));

    for (label, version) in [("v2", SignatureVersion::V2), ("v4", SignatureVersion::V4)] {
        let signer = signer(version);

        group.bench_function(BenchmarkId::new("get_minimal", label), |b| {
            b.iter(|| {
                let ctx = SigningContext::new(
                    http::Method::GET,
                    "s3.example.com",
                    black_box("/my-bucket/a/b/c/object.txt"),
                    at,
                );
                black_box(signer.sign(ctx).expect("signing must succeed"));
            });
        });

        group.bench_function(BenchmarkId::new("put_with_headers", label), |b| {
            let ct = http::HeaderValue::from_static("application/octet-stream");
            b.iter(|| {
                let ctx = SigningContext::new(
                    http::Method::PUT,
                    "s3.example.com",
                    black_box("/my-bucket/a/b/c/object.txt"),
                    at,
                )
                .header(http::header::CONTENT_TYPE, ct.clone())
                .header(
                    http::HeaderName::from_static("x-amz-meta-m1"),
                    http::HeaderValue::from_static("v1"),
                )
                .body(body.clone());
                black_box(signer.sign(ctx).expect("signing must succeed"));
            });
        });
    }

    group.finish();
}

fn bench_listing_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing_decode");
    group.measurement_time(Duration::from_secs(3));

    for entries in [1usize, 100, 1000] {
        let body = listing(entries);
        group.bench_with_input(
            BenchmarkId::new("object_page", entries),
            body.as_bytes(),
            |b, input| {
                b.iter(|| {
                    let page = decode::decode_object_page(black_box(input))
                        .expect("listing must decode");
                    black_box(page);
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("collect_keys", entries),
            body.as_bytes(),
            |b, input| {
                b.iter(|| {
                    let keys =
                        decode::collect_text(black_box(input), "Key").expect("listing must decode");
                    black_box(keys);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_signing, bench_listing_decode);
criterion_main!(benches);
