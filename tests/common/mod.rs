//! Certificate fixtures generated at test time.

#![allow(dead_code)]

use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose, SanType,
};
use spiffe_svid_validator::cert::Certificate;

/// A generated certificate together with its signing key.
pub struct CertAndKey {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl CertAndKey {
    pub fn der(&self) -> &[u8] {
        self.cert.der().as_ref()
    }

    pub fn certificate(&self) -> Certificate {
        Certificate::try_from(self.der()).unwrap()
    }
}

fn params(common_name: &str, uris: &[&str]) -> CertificateParams {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CountryName, "US");
    dn.push(DnType::OrganizationName, "SPIRE");
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;

    params.subject_alt_names = uris
        .iter()
        .map(|u| SanType::URI((*u).try_into().unwrap()))
        .collect();

    params
}

fn ca_params(common_name: &str, uri: &str) -> CertificateParams {
    let mut params = params(common_name, &[uri]);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params
}

fn leaf_params(uris: &[&str]) -> CertificateParams {
    let mut params = params("workload", uris);
    params.is_ca = IsCa::NoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params
}

fn sign(params: CertificateParams, issuer: &CertAndKey) -> CertAndKey {
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    CertAndKey { cert, key }
}

/// Self-signed root CA.
pub fn root_ca(common_name: &str, uri: &str) -> CertAndKey {
    let key = KeyPair::generate().unwrap();
    let cert = ca_params(common_name, uri).self_signed(&key).unwrap();
    CertAndKey { cert, key }
}

/// Intermediate CA signed by `issuer`.
pub fn intermediate_ca(common_name: &str, uri: &str, issuer: &CertAndKey) -> CertAndKey {
    sign(ca_params(common_name, uri), issuer)
}

/// Certificate signed by `issuer` with `CA:FALSE`, used where a CA is expected.
pub fn non_ca(common_name: &str, uri: &str, issuer: &CertAndKey) -> CertAndKey {
    let mut params = ca_params(common_name, uri);
    params.is_ca = IsCa::ExplicitNoCa;
    sign(params, issuer)
}

/// Leaf certificate carrying the given URI SANs.
pub fn leaf(uris: &[&str], issuer: &CertAndKey) -> CertAndKey {
    sign(leaf_params(uris), issuer)
}

/// Leaf certificate carrying a DNS SAN only.
pub fn leaf_with_dns_san(issuer: &CertAndKey) -> CertAndKey {
    let mut params = leaf_params(&[]);
    params.subject_alt_names = vec![SanType::DnsName("workload.example.org".try_into().unwrap())];
    sign(params, issuer)
}

/// Leaf certificate that expired in 2001.
pub fn expired_leaf(uri: &str, issuer: &CertAndKey) -> CertAndKey {
    let mut params = leaf_params(&[uri]);
    params.not_before = date_time_ymd(2000, 1, 1);
    params.not_after = date_time_ymd(2001, 1, 1);
    sign(params, issuer)
}

/// Leaf certificate restricted to the given extended key usages.
pub fn leaf_with_eku(
    uri: &str,
    eku: Vec<ExtendedKeyUsagePurpose>,
    issuer: &CertAndKey,
) -> CertAndKey {
    let mut params = leaf_params(&[uri]);
    params.extended_key_usages = eku;
    sign(params, issuer)
}

/// The chain `leaf <- intermediate2 <- intermediate1 <- root` for `example.org`.
pub struct ChainFixture {
    pub root: CertAndKey,
    pub other_root: CertAndKey,
    pub intermediate1: CertAndKey,
    pub intermediate2: CertAndKey,
    pub leaf: CertAndKey,
}

impl ChainFixture {
    pub fn new() -> Self {
        let root = root_ca("root", "spiffe://example.org");
        let intermediate1 = intermediate_ca("intermediate1", "spiffe://example.org/host", &root);
        let intermediate2 =
            intermediate_ca("intermediate2", "spiffe://example.org/host2", &intermediate1);
        let leaf = leaf(&["spiffe://example.org/test"], &intermediate2);
        // same subject as `root`, different key
        let other_root = root_ca("root", "spiffe://example.org");

        Self {
            root,
            other_root,
            intermediate1,
            intermediate2,
            leaf,
        }
    }

    /// Leaf-first chain without the root.
    pub fn chain(&self) -> Vec<Certificate> {
        vec![
            self.leaf.certificate(),
            self.intermediate2.certificate(),
            self.intermediate1.certificate(),
        ]
    }
}
