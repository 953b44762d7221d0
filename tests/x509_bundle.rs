mod common;

use common::{root_ca, ChainFixture};
use spiffe_svid_validator::cert::error::CertificateError;
use spiffe_svid_validator::cert::{parse_chain_from_der, spiffe_id_from_der};
use spiffe_svid_validator::{
    BundleSource, SpiffeId, TrustDomain, X509Bundle, X509BundleError, X509BundleSet,
};

fn example_org() -> TrustDomain {
    TrustDomain::new("example.org").unwrap()
}

#[test]
fn test_parse_bundle_from_der() {
    let fixture = ChainFixture::new();
    let der = [fixture.root.der(), fixture.other_root.der()].concat();

    let bundle = X509Bundle::parse_from_der(example_org(), &der).unwrap();

    assert_eq!(bundle.trust_domain(), &example_org());
    assert_eq!(bundle.authorities().len(), 2);
    assert_eq!(bundle.authorities()[0].as_bytes(), fixture.root.der());
    assert_eq!(bundle.authorities()[1].as_bytes(), fixture.other_root.der());
}

#[test]
fn test_parse_bundle_from_der_deduplicates() {
    let fixture = ChainFixture::new();
    let der = [fixture.root.der(), fixture.root.der()].concat();

    let bundle = X509Bundle::parse_from_der(example_org(), &der).unwrap();

    assert_eq!(bundle.authorities().len(), 1);
}

#[test]
fn test_parse_bundle_from_corrupted_der() {
    let fixture = ChainFixture::new();
    let mut der = fixture.root.der().to_vec();
    der.truncate(der.len() / 2);

    let err = X509Bundle::parse_from_der(example_org(), &der).unwrap_err();
    assert!(matches!(
        err,
        X509BundleError::Certificate(CertificateError::ParseX509Certificate(..))
    ));
}

#[test]
fn test_bundle_from_authorities_deduplicates() {
    let fixture = ChainFixture::new();

    let bundle = X509Bundle::from_x509_authorities(
        example_org(),
        &[fixture.root.der(), fixture.other_root.der(), fixture.root.der()],
    )
    .unwrap();

    assert_eq!(bundle.authorities().len(), 2);
    assert!(bundle.has_authority(fixture.root.der()));
    assert!(bundle.has_authority(fixture.other_root.der()));
}

#[test]
fn test_bundle_equality_ignores_authority_order() {
    let fixture = ChainFixture::new();

    let a = X509Bundle::from_x509_authorities(
        example_org(),
        &[fixture.root.der(), fixture.other_root.der()],
    )
    .unwrap();
    let b = X509Bundle::from_x509_authorities(
        example_org(),
        &[fixture.other_root.der(), fixture.root.der(), fixture.root.der()],
    )
    .unwrap();
    assert_eq!(a, b);

    let only_root =
        X509Bundle::from_x509_authorities(example_org(), &[fixture.root.der()]).unwrap();
    assert_ne!(a, only_root);

    let other_td = X509Bundle::from_x509_authorities(
        TrustDomain::new("other.org").unwrap(),
        &[fixture.root.der(), fixture.other_root.der()],
    )
    .unwrap();
    assert_ne!(a, other_td);
}

#[test]
fn test_add_and_remove_authority() {
    let fixture = ChainFixture::new();
    let mut bundle = X509Bundle::new(example_org());
    assert!(bundle.authorities().is_empty());

    bundle.add_authority(fixture.root.der()).unwrap();
    bundle.add_authority(fixture.root.der()).unwrap();
    assert_eq!(bundle.authorities().len(), 1);

    assert!(bundle.remove_authority(fixture.root.der()));
    assert!(!bundle.remove_authority(fixture.root.der()));
    assert!(!bundle.has_authority(fixture.root.der()));
}

#[test]
fn test_add_invalid_authority() {
    let mut bundle = X509Bundle::new(example_org());

    let err = bundle.add_authority(b"not a certificate").unwrap_err();
    assert!(matches!(err, X509BundleError::Certificate(..)));
    assert!(bundle.authorities().is_empty());
}

#[test]
fn test_bundle_as_source() {
    let fixture = ChainFixture::new();
    let bundle = X509Bundle::from_x509_authorities(example_org(), &[fixture.root.der()]).unwrap();

    let found = bundle
        .bundle_for_trust_domain(&example_org())
        .unwrap()
        .unwrap();
    assert_eq!(*found, bundle);

    let other = TrustDomain::new("other.org").unwrap();
    assert!(bundle.bundle_for_trust_domain(&other).unwrap().is_none());
}

#[test]
fn test_bundle_set_as_source() {
    let example = root_ca("root", "spiffe://example.org");
    let other = root_ca("root", "spiffe://other.org");
    let other_org = TrustDomain::new("other.org").unwrap();

    let mut set = X509BundleSet::new();
    assert!(set.is_empty());

    set.add_bundle(X509Bundle::from_x509_authorities(example_org(), &[example.der()]).unwrap());
    set.add_bundle(X509Bundle::from_x509_authorities(other_org.clone(), &[other.der()]).unwrap());
    assert_eq!(set.len(), 2);

    let found = set.bundle_for_trust_domain(&other_org).unwrap().unwrap();
    assert!(found.has_authority(other.der()));
    assert!(!found.has_authority(example.der()));

    let missing = TrustDomain::new("missing.org").unwrap();
    assert!(set.bundle_for_trust_domain(&missing).unwrap().is_none());
    assert!(set.get_bundle(&missing).is_none());
}

#[test]
fn test_bundle_set_replaces_bundle_of_same_trust_domain() {
    let fixture = ChainFixture::new();

    let mut set = X509BundleSet::default();
    set.add_bundle(X509Bundle::from_x509_authorities(example_org(), &[fixture.root.der()]).unwrap());
    set.add_bundle(
        X509Bundle::from_x509_authorities(example_org(), &[fixture.other_root.der()]).unwrap(),
    );

    assert_eq!(set.len(), 1);
    let bundle = set.get_bundle(&example_org()).unwrap();
    assert!(bundle.has_authority(fixture.other_root.der()));
    assert!(!bundle.has_authority(fixture.root.der()));
}

#[test]
fn test_bundle_lookup_uses_normalized_trust_domain() {
    let fixture = ChainFixture::new();
    let bundle = X509Bundle::from_x509_authorities(
        TrustDomain::new("Example.ORG").unwrap(),
        &[fixture.root.der()],
    )
    .unwrap();

    assert!(bundle
        .bundle_for_trust_domain(&example_org())
        .unwrap()
        .is_some());
}

#[test]
fn test_parse_chain_from_der() {
    let fixture = ChainFixture::new();
    let der = [
        fixture.leaf.der(),
        fixture.intermediate2.der(),
        fixture.intermediate1.der(),
    ]
    .concat();

    let chain = parse_chain_from_der(&der).unwrap();

    assert_eq!(chain, fixture.chain());
    assert_eq!(
        chain[0].spiffe_id().unwrap(),
        SpiffeId::new("spiffe://example.org/test").unwrap()
    );
}

#[test]
fn test_parse_chain_from_der_too_long() {
    let fixture = ChainFixture::new();
    let der = vec![fixture.leaf.der(); 17].concat();

    let err = parse_chain_from_der(&der).unwrap_err();
    assert!(matches!(
        err,
        CertificateError::TooManyCertificates { max: 16 }
    ));
}

#[test]
fn test_spiffe_id_from_der() {
    let fixture = ChainFixture::new();

    assert_eq!(
        spiffe_id_from_der(fixture.intermediate1.der()).unwrap(),
        SpiffeId::new("spiffe://example.org/host").unwrap()
    );
    assert_eq!(
        spiffe_id_from_der(fixture.root.der()).unwrap().to_string(),
        "spiffe://example.org"
    );
}
