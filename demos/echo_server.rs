// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! An echo server: replies to every request on `echo/:name` with the
//! request's own payload prefixed by the captured name. Grounded on
//! `client/client_test.go`'s `runEchoServer` helper.

use rrmq::Engine;

#[tokio::main]
async fn main() -> rrmq::Result<()> {
    rrmq::logger::init(false, log::LevelFilter::Info);

    let broker = std::env::args().nth(1).unwrap_or_else(|| "mqtt://localhost:1883".to_string());

    let mut engine = Engine::new();
    engine.route("echo/:name", |c| {
        let name = c.param("name");
        let payload = c.get_raw_string();
        c.string(format!("{name}: {payload}"));
    });
    let handle = engine.run(&broker).await?;

    tokio::signal::ctrl_c().await.ok();
    handle.close().await
}
