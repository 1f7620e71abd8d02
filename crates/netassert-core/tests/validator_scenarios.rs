use std::sync::Arc;

use netassert_core::{
    EntityKind, EntityPath, ListMode, MemoryProvisioner, ObservedState, Outcome, OutputKey,
    Topology, ValidateError, Validator, ValidatorConfig,
};
use serde_json::{json, Value};

fn two_networks() -> Value {
    json!({
        "vnet1": {
            "name": "vnet1",
            "location": "westeurope",
            "resourceGroup": "rg-test",
            "addressSpace": ["10.0.0.0/16"],
            "subnetworks": {
                "subnet1": {"name": "subnet1", "addressPrefixes": ["10.0.1.0/24"]}
            }
        },
        "vnet2": {
            "name": "vnet2",
            "location": "westeurope",
            "resourceGroup": "rg-test",
            "addressSpace": ["10.1.0.0/16"],
            "subnetworks": {
                "subnet2": {"name": "subnet2", "addressPrefixes": ["10.1.1.0/24"]}
            }
        }
    })
}

fn delegated() -> Value {
    json!({
        "hub": {
            "name": "vnet-hub",
            "addressSpace": ["10.10.0.0/16"],
            "subnetworks": {
                "aci": {
                    "name": "snet-aci",
                    "addressPrefixes": ["10.10.1.0/24"],
                    "nsgName": "nsg-aci",
                    "serviceEndpoints": ["Microsoft.Storage"],
                    "privateEndpointNetworkPolicies": "Disabled",
                    "delegations": [{
                        "name": "aci-delegation",
                        "serviceDelegation": {
                            "name": "Microsoft.ContainerInstance/containerGroups",
                            "actions": ["Microsoft.Network/virtualNetworks/subnets/action"]
                        }
                    }]
                }
            }
        }
    })
}

fn subnet1_path() -> EntityPath {
    EntityPath::root()
        .child(EntityKind::Network, "vnet1")
        .child(EntityKind::Subnetwork, "subnet1")
}

async fn run(
    topology: &Topology,
    observed: Value,
    config: ValidatorConfig,
) -> Result<netassert_core::Report, ValidateError> {
    let state: Arc<dyn ObservedState> = Arc::new(MemoryProvisioner::with_outputs(observed));
    Validator::new(config).validate(topology, state).await
}

// ── matching state ────────────────────────────────────────────────────────

#[tokio::test]
async fn two_network_scenario_passes_against_matching_outputs() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let report = run(&topology, declared, ValidatorConfig::default())
        .await
        .unwrap();

    assert!(report.all_passed(), "{}", report.format());
    assert!(report.failures().is_empty());
    // name, location, resourceGroup, addressSpace per vnet + name, addressPrefixes per subnet
    assert_eq!(report.findings().len(), 12);
}

#[tokio::test]
async fn nested_delegation_passes_with_list_shaped_observed_output() {
    let declared = delegated();
    let topology = Topology::build(&declared).unwrap();

    // Providers usually report delegations as a list; lookups match by name.
    let report = run(&topology, declared, ValidatorConfig::default())
        .await
        .unwrap();

    assert!(report.all_passed(), "{}", report.format());
    let delegation = EntityPath::root()
        .child(EntityKind::Network, "hub")
        .child(EntityKind::Subnetwork, "aci")
        .child(EntityKind::Delegation, "aci-delegation");
    let attrs: Vec<&str> = report
        .findings_at(&delegation)
        .into_iter()
        .map(|f| f.attribute.as_str())
        .collect();
    assert_eq!(
        attrs,
        vec![
            "name",
            "serviceDelegation.actions",
            "serviceDelegation.name"
        ]
    );
}

// ── drift ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_altered_prefix_yields_exactly_one_mismatch() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let mut observed = declared.clone();
    observed["vnet1"]["subnetworks"]["subnet1"]["addressPrefixes"] = json!(["10.0.2.0/24"]);

    let config = ValidatorConfig::default().with_list_mode(ListMode::Exact);
    let report = run(&topology, observed, config).await.unwrap();

    assert!(!report.all_passed());
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, subnet1_path());
    assert_eq!(failures[0].attribute, "addressPrefixes");
    assert_eq!(failures[0].outcome, Outcome::Mismatch);
    assert_eq!(failures[0].observed, Some(json!(["10.0.2.0/24"])));
}

#[tokio::test]
async fn contains_all_tolerates_provider_defaults_but_exact_does_not() {
    let declared = delegated();
    let topology = Topology::build(&declared).unwrap();

    let mut observed = declared.clone();
    observed["hub"]["subnetworks"]["aci"]["serviceEndpoints"] =
        json!(["Microsoft.KeyVault", "Microsoft.Storage"]);

    let lenient = run(&topology, observed.clone(), ValidatorConfig::default())
        .await
        .unwrap();
    assert!(lenient.all_passed(), "{}", lenient.format());

    let strict = run(
        &topology,
        observed,
        ValidatorConfig::default().with_list_mode(ListMode::Exact),
    )
    .await
    .unwrap();
    assert_eq!(strict.failures().len(), 1);
    assert_eq!(strict.failures()[0].attribute, "serviceEndpoints");
}

#[tokio::test]
async fn every_mismatch_is_reported_not_just_the_first() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let mut observed = declared.clone();
    observed["vnet1"]["location"] = json!("northeurope");
    observed["vnet2"]["addressSpace"] = json!(["192.168.0.0/16"]);
    observed["vnet2"]["subnetworks"]["subnet2"]["name"] = json!("Subnet2");

    let report = run(&topology, observed, ValidatorConfig::default())
        .await
        .unwrap();

    let failed: Vec<String> = report
        .failures()
        .iter()
        .map(|f| format!("{}:{}", f.path, f.attribute))
        .collect();
    assert_eq!(
        failed,
        vec![
            "vnet1:location",
            "vnet2:addressSpace",
            "vnet2/subnet2:name"
        ]
    );
}

// ── missing ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_entity_is_missing_and_siblings_still_checked() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let mut observed = declared.clone();
    observed["vnet1"]["subnetworks"]
        .as_object_mut()
        .unwrap()
        .remove("subnet1");

    let report = run(&topology, observed, ValidatorConfig::default())
        .await
        .unwrap();

    let at_subnet1 = report.findings_at(&subnet1_path());
    assert_eq!(at_subnet1.len(), 2);
    assert!(at_subnet1.iter().all(|f| f.outcome == Outcome::Missing));
    assert!(at_subnet1.iter().all(|f| f.observed.is_none()));

    // vnet1's own attributes and the whole of vnet2 were still validated.
    assert_eq!(report.findings().len(), 12);
    assert_eq!(report.failures().len(), 2);
}

#[tokio::test]
async fn zero_children_checks_own_attributes_only() {
    let declared = json!({"solo": {"name": "vnet-solo", "addressSpace": ["10.9.0.0/16"]}});
    let topology = Topology::build(&declared).unwrap();

    let report = run(&topology, declared, ValidatorConfig::default())
        .await
        .unwrap();

    assert_eq!(report.findings().len(), 2);
    assert!(report.all_passed());
}

#[tokio::test]
async fn unrecognized_fields_are_not_validated() {
    let declared = json!({"v": {"name": "v", "tags": {"env": "ci"}, "ddosPlan": "std"}});
    let topology = Topology::build(&declared).unwrap();

    let report = run(&topology, json!({"v": {"name": "v"}}), ValidatorConfig::default())
        .await
        .unwrap();

    assert!(report.all_passed());
    assert_eq!(report.findings().len(), 1);
}

// ── determinism ───────────────────────────────────────────────────────────

#[tokio::test]
async fn validating_twice_yields_identical_reports() {
    let declared = delegated();
    let topology = Topology::build(&declared).unwrap();
    let mut observed = declared.clone();
    observed["hub"]["addressSpace"] = json!(["10.20.0.0/16"]);

    let state: Arc<dyn ObservedState> = Arc::new(MemoryProvisioner::with_outputs(observed));
    let validator = Validator::new(ValidatorConfig::default());

    let first = validator.validate(&topology, Arc::clone(&state)).await.unwrap();
    let second = validator.validate(&topology, state).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.format(), second.format());
    assert_eq!(first.digest(), second.digest());
}

#[tokio::test]
async fn output_prefix_addresses_wrapped_outputs() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let config = ValidatorConfig::default().with_output_prefix(OutputKey::new(["vnets"]));
    let report = run(&topology, json!({ "vnets": declared }), config)
        .await
        .unwrap();

    assert!(report.all_passed(), "{}", report.format());
}

// ── provider faults ───────────────────────────────────────────────────────

#[tokio::test]
async fn provider_fault_aborts_subtree_and_preserves_the_rest() {
    let declared = two_networks();
    let topology = Topology::build(&declared).unwrap();

    let fake = Arc::new(MemoryProvisioner::with_outputs(declared));
    fake.fail_lookups_under(OutputKey::parse_dotted("vnet1.subnetworks"));
    let state: Arc<dyn ObservedState> = fake;

    let err = Validator::new(ValidatorConfig::default())
        .validate(&topology, state)
        .await
        .unwrap_err();

    match err {
        ValidateError::Provider { faults, partial } => {
            assert_eq!(faults.len(), 1);
            assert_eq!(faults[0].path, subnet1_path());
            // vnet1 (4) + vnet2 (4) + subnet2 (2); subnet1 never produced a finding.
            assert_eq!(partial.findings().len(), 10);
            assert!(partial.all_passed());
            assert_eq!(partial.findings_at(&subnet1_path()).len(), 0);
        }
        other => panic!("Expected Provider, got {:?}", other),
    }
}
