// Copyright 2024 RustFS Team
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

use neutron_openstack::{AuthOptions, KeystoneVersion, NeutronClient, OpenStackError, ResourceKind, authenticate, neutron};
use neutron_test_support::{
    ADMIN_TENANT_ID, DEMO_TENANT_ID, FIXTURE_PASSWORD, FIXTURE_TENANT, FIXTURE_TOKEN, FIXTURE_USER, FixtureCloud, FixtureData,
    init_logging,
};

fn opts(cloud: &FixtureCloud) -> AuthOptions {
    AuthOptions::new(cloud.endpoint(), FIXTURE_USER, FIXTURE_PASSWORD, FIXTURE_TENANT)
}

async fn connect(cloud: &FixtureCloud) -> NeutronClient {
    let session = authenticate(&opts(cloud)).await.unwrap();
    NeutronClient::new(&session).unwrap()
}

#[tokio::test]
async fn test_v2_authentication_and_tenants() {
    init_logging();
    let cloud = FixtureCloud::start().await.unwrap();

    let session = authenticate(&opts(&cloud)).await.unwrap();
    assert_eq!(session.token(), FIXTURE_TOKEN);
    assert_eq!(session.version(), KeystoneVersion::V2_0);
    assert!(!session.is_expired());
    assert_eq!(cloud.auth_requests(), 1);

    let client = NeutronClient::new(&session).unwrap();
    assert_eq!(client.network_base().as_str(), format!("{}v2.0/", cloud.endpoint()));

    let tenants = neutron::get_all_tenants(&client).await.unwrap();
    assert_eq!(tenants.len(), 2);
    assert!(tenants.iter().any(|t| t.name == "demo" && t.id == DEMO_TENANT_ID));
    assert!(tenants.iter().any(|t| t.name == "admin" && t.id == ADMIN_TENANT_ID));
}

#[tokio::test]
async fn test_v3_authentication_and_projects() {
    init_logging();
    let cloud = FixtureCloud::start().await.unwrap();

    let session = authenticate(&opts(&cloud).with_domain_name("Default")).await.unwrap();
    assert_eq!(session.version(), KeystoneVersion::V3);
    assert_eq!(session.token(), FIXTURE_TOKEN);

    let client = NeutronClient::new(&session).unwrap();
    let tenants = neutron::get_all_tenants(&client).await.unwrap();
    assert_eq!(tenants.len(), 2);
}

#[tokio::test]
async fn test_authentication_rejected() {
    init_logging();
    let cloud = FixtureCloud::builder().reject_auth().start().await.unwrap();

    let err = authenticate(&opts(&cloud)).await.unwrap_err();
    assert!(err.is_auth_error());
    match err {
        OpenStackError::AuthenticationFailed { username, tenant, .. } => {
            assert_eq!(username, FIXTURE_USER);
            assert_eq!(tenant, FIXTURE_TENANT);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_wrong_password() {
    let cloud = FixtureCloud::start().await.unwrap();
    let opts = AuthOptions::new(cloud.endpoint(), FIXTURE_USER, "wrong", FIXTURE_TENANT);
    assert!(authenticate(&opts).await.unwrap_err().is_auth_error());
}

#[tokio::test]
async fn test_resource_counts_per_tenant() {
    init_logging();
    let cloud = FixtureCloud::start().await.unwrap();
    let client = connect(&cloud).await;
    let tenants = neutron::get_all_tenants(&client).await.unwrap();

    let networks = neutron::get_network_count_per_tenant(&client, &tenants).await.unwrap();
    let subnets = neutron::get_subnets_count_per_tenant(&client, &tenants).await.unwrap();
    let routers = neutron::get_routers_count_per_tenant(&client, &tenants).await.unwrap();
    let ports = neutron::get_ports_count_per_tenant(&client, &tenants).await.unwrap();
    let floating_ips = neutron::get_floating_ips_count_per_tenant(&client, &tenants).await.unwrap();

    assert_eq!(networks["admin"], 2);
    assert_eq!(networks["demo"], 1);
    assert_eq!(subnets["admin"], 3);
    assert_eq!(subnets["demo"], 0);
    assert_eq!(routers["admin"], 4);
    assert_eq!(routers["demo"], 0);
    assert_eq!(ports["admin"], 3);
    assert_eq!(ports["demo"], 0);
    assert_eq!(floating_ips["admin"], 2);
    assert_eq!(floating_ips["demo"], 0);
}

#[tokio::test]
async fn test_paginated_listing() {
    init_logging();
    let mut data = FixtureData::canonical();
    data.add_resources("ports", DEMO_TENANT_ID, 6);
    let cloud = FixtureCloud::builder().data(data).page_size(2).start().await.unwrap();
    let client = connect(&cloud).await;

    let ports = client_list(&client, ResourceKind::Ports).await;
    assert_eq!(ports, 9);

    let tenants = neutron::get_all_tenants(&client).await.unwrap();
    let counts = neutron::get_ports_count_per_tenant(&client, &tenants).await.unwrap();
    assert_eq!(counts["admin"], 3);
    assert_eq!(counts["demo"], 6);
}

#[tokio::test]
async fn test_looping_pagination_is_an_error() {
    init_logging();
    let cloud = FixtureCloud::builder().page_size(2).looping("networks").start().await.unwrap();
    let client = connect(&cloud).await;

    use neutron_openstack::NetworkingApi;
    let err = client.list_resources(ResourceKind::Networks).await.unwrap_err();
    assert!(matches!(err, OpenStackError::ParseError { ref reason, .. } if reason.contains("loop")));

    // a handful of pages, not a runaway walk
    assert!(cloud.api_requests() <= 4);

    let tenants = neutron::get_all_tenants(&client).await.unwrap();
    assert!(neutron::get_network_count_per_tenant(&client, &tenants).await.is_err());
    assert_eq!(neutron::get_routers_count_per_tenant(&client, &tenants).await.unwrap()["admin"], 4);
}

async fn client_list(client: &NeutronClient, kind: ResourceKind) -> usize {
    use neutron_openstack::NetworkingApi;
    client.list_resources(kind).await.unwrap().len()
}

#[tokio::test]
async fn test_quotas_per_tenant() {
    init_logging();
    let cloud = FixtureCloud::start().await.unwrap();
    let client = connect(&cloud).await;
    let tenants = neutron::get_all_tenants(&client).await.unwrap();

    let quotas = neutron::get_quotas_per_tenant(&client, &tenants).await.unwrap();
    assert_eq!(quotas.len(), 2);

    let admin = &quotas["admin"];
    assert_eq!(admin.len(), 9);
    assert_eq!(admin["network"], 13);
    assert_eq!(admin["subnetpool"], -1);
    assert_eq!(admin["rbac_policy"], -1);

    let demo = neutron::get_quotas_for_tenant(&client, DEMO_TENANT_ID).await.unwrap();
    assert_eq!(demo["floatingip"], 51);
    assert_eq!(demo["subnetpool"], 0);
}

#[tokio::test]
async fn test_quota_missing_for_tenant() {
    let cloud = FixtureCloud::start().await.unwrap();
    let client = connect(&cloud).await;

    let err = neutron::get_quotas_for_tenant(&client, "333333").await.unwrap_err();
    assert!(matches!(err, OpenStackError::MalformedQuota { ref tenant_id, .. } if tenant_id == "333333"));
}

#[tokio::test]
async fn test_listing_failure_is_reported() {
    init_logging();
    let cloud = FixtureCloud::builder().failing("routers").start().await.unwrap();
    let client = connect(&cloud).await;
    let tenants = neutron::get_all_tenants(&client).await.unwrap();

    let err = neutron::get_routers_count_per_tenant(&client, &tenants).await.unwrap_err();
    assert!(matches!(err, OpenStackError::UnexpectedStatus { status: 500, .. }));
    assert!(err.is_retryable());

    // other collections are unaffected
    let networks = neutron::get_network_count_per_tenant(&client, &tenants).await.unwrap();
    assert_eq!(networks["admin"], 2);
}

#[tokio::test]
async fn test_token_expiry_reported() {
    let cloud = FixtureCloud::builder().expires("2016-02-21T14:28:30Z").start().await.unwrap();

    let session = authenticate(&opts(&cloud)).await.unwrap();
    assert!(session.is_expired());
    assert!(session.expires_at().is_some());
}
