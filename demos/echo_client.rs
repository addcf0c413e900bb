// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Sends a single request to the echo server and prints the response.
//! Grounded on `client/client_test.go`'s `TestRequest`.

use std::time::Duration;

use rrmq::Client;

#[tokio::main]
async fn main() -> rrmq::Result<()> {
    rrmq::logger::init(false, log::LevelFilter::Info);

    let broker = std::env::args().nth(1).unwrap_or_else(|| "mqtt://localhost:1883".to_string());
    let name = std::env::args().nth(2).unwrap_or_else(|| "world".to_string());

    let client = Client::connect(&broker).await?;
    let response = client
        .request(format!("echo/{name}"), b"hello".to_vec(), Duration::from_secs(5))
        .await?;
    println!("{}", String::from_utf8_lossy(&response.payload));
    client.close().await?;
    Ok(())
}
