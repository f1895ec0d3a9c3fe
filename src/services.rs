//! Service identification.
//!
//! Maps well-known port numbers to service names through a process-wide,
//! read-only table, and refines that guess from a captured banner.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Label used when nothing is known about a port.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Curated core of the well-known service table; an "all" selector scans these.
pub const WELL_KNOWN_PORTS: [u16; 19] = [
    20, 21, 22, 23, 25, 53, 80, 110, 143, 443, 445, 3306, 3389, 5432, 5900, 6379, 8080, 8443,
    27017,
];

/// Banner keywords, checked in order. The first entry whose keywords appear
/// in the lowercased banner names the service.
const BANNER_KEYWORDS: &[(&[&str], &str)] = &[
    (&["ssh"], "ssh"),
    (&["ftp"], "ftp"),
    (&["http", "html"], "http"),
    (&["smtp", "mail"], "smtp"),
    (&["mysql"], "mysql"),
    (&["redis"], "redis"),
];

/// Port/name pairs backing the lookup table.
const SERVICE_TABLE: &[(u16, &str)] = &[
    (20, "ftp-data"), (21, "ftp"), (22, "ssh"), (23, "telnet"), (25, "smtp"),
    (53, "dns"), (67, "dhcp-server"), (68, "dhcp-client"), (69, "tftp"),
    (80, "http"), (88, "kerberos"), (110, "pop3"), (111, "rpcbind"), (119, "nntp"),
    (123, "ntp"), (135, "msrpc"), (137, "netbios-ns"), (138, "netbios-dgm"),
    (139, "netbios-ssn"), (143, "imap"), (161, "snmp"), (162, "snmptrap"),
    (179, "bgp"), (194, "irc"), (389, "ldap"), (443, "https"), (445, "microsoft-ds"),
    (464, "kpasswd"), (465, "smtps"), (500, "isakmp"), (513, "rlogin"),
    (514, "syslog"), (515, "printer"), (520, "rip"), (521, "ripng"),
    (523, "ibm-db2"), (543, "klogin"), (544, "kshell"), (548, "afp"), (554, "rtsp"),
    (587, "submission"), (631, "ipp"), (636, "ldaps"), (873, "rsync"),
    (902, "vmware-auth"), (993, "imaps"), (995, "pop3s"), (1080, "socks"),
    (1194, "openvpn"), (1433, "mssql"), (1434, "mssql-m"), (1521, "oracle"),
    (1701, "l2tp"), (1723, "pptp"), (1812, "radius"), (1813, "radius-acct"),
    (1883, "mqtt"), (2049, "nfs"), (2082, "cpanel"), (2083, "cpanel-ssl"),
    (2086, "whm"), (2087, "whm-ssl"), (2181, "zookeeper"), (2375, "docker"),
    (2376, "docker-ssl"), (3000, "grafana"), (3128, "squid"), (3268, "globalcat"),
    (3269, "globalcat-ssl"), (3306, "mysql"), (3389, "rdp"), (3690, "svn"),
    (4369, "epmd"), (4443, "pharos"), (5000, "upnp"), (5060, "sip"), (5061, "sips"),
    (5222, "xmpp-client"), (5269, "xmpp-server"), (5432, "postgresql"),
    (5672, "amqp"), (5900, "vnc"), (5984, "couchdb"), (6379, "redis"),
    (6443, "kubernetes-api"), (6666, "irc"), (6667, "irc"), (7001, "weblogic"),
    (7077, "spark-master"), (8000, "http-alt"), (8008, "http-alt"),
    (8080, "http-proxy"), (8081, "http-alt"), (8082, "http-alt"), (8083, "http-alt"),
    (8443, "https-alt"), (8888, "http-alt"), (9000, "cslistener"),
    (9042, "cassandra"), (9090, "prometheus"), (9092, "kafka"),
    (9200, "elasticsearch"), (9300, "elasticsearch-cluster"), (9418, "git"),
    (10000, "webmin"), (11211, "memcached"), (15672, "rabbitmq-mgmt"),
    (27017, "mongodb"), (27018, "mongodb"), (27019, "mongodb"),
    (28017, "mongodb-web"), (50000, "db2"), (50070, "hdfs-namenode"),
    (50075, "hdfs-datanode"),
];

/// Process-wide port to service-name index, built once on first use.
static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> =
    LazyLock::new(|| SERVICE_TABLE.iter().copied().collect());

/// Look up the probable service name for a given port.
///
/// Returns `None` if the port is not in the well-known services database.
pub fn get_service_name(port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&port).copied()
}

/// Get a descriptive string for the service on a port.
///
/// Returns "unknown" if the port is not recognized.
pub fn get_service_description(port: u16) -> &'static str {
    get_service_name(port).unwrap_or(UNKNOWN_SERVICE)
}

/// Identify a service from its banner, keeping `fallback` when no keyword
/// matches.
pub fn identify_by_banner<'a>(banner: &str, fallback: &'a str) -> &'a str {
    let lowered = banner.to_lowercase();
    BANNER_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|&(_, service)| service)
        .unwrap_or(fallback)
}
