// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use snafu::{ResultExt, Snafu};
use std::io::{self, Cursor};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("decode base64 certificate error"))]
    InvalidEncoding { source: base64::DecodeError },

    #[snafu(display("parse certificate error"))]
    InvalidCertificate { source: io::Error },

    #[snafu(display("no certificate"))]
    NonCertificate,
}

/// DER certificates from a PEM bundle.
pub fn load_certs(pem: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let certs = rustls_pemfile::certs(&mut Cursor::new(pem))
        .map(|cert| cert.map(|der| der.to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .context(InvalidCertificateSnafu)?;

    if certs.is_empty() {
        return NonCertificateSnafu.fail();
    }

    Ok(certs)
}

/// DER certificates from a base64 encoded PEM bundle, the form GKE reports
/// `masterAuth.clusterCaCertificate` in.
pub fn load_base64_certs(encoded: &str) -> Result<Vec<Vec<u8>>, Error> {
    let pem = STANDARD
        .decode(encoded.trim())
        .context(InvalidEncodingSnafu)?;
    load_certs(&pem)
}
