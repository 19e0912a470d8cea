/// One collection binding: URL path, backing collection, and the fixed
/// message texts this resource answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub path: &'static str,
    pub collection: &'static str,
    pub added_label: &'static str,
    pub deleted_label: &'static str,
    pub not_found: &'static str,
}

pub const CARS: ResourceSpec = ResourceSpec {
    path: "/auto",
    collection: "auto",
    added_label: "Car",
    deleted_label: "Car",
    not_found: "Car not found",
};

pub const COMMERCIAL_VEHICLES: ResourceSpec = ResourceSpec {
    path: "/commerciali",
    collection: "commerciali",
    added_label: "Commercial vehicle",
    deleted_label: "Commercial vehicle",
    not_found: "Commercial vehicle not found",
};

pub const COMMERCIAL_CARS: ResourceSpec = ResourceSpec {
    path: "/autocarri",
    collection: "autocarri",
    added_label: "Commercial car",
    deleted_label: "Commercial car",
    not_found: "Commercial car not found",
};

// The business resource keeps the generic car wording on 404 and lowercases
// "car" in its delete confirmation.
pub const BUSINESS_CARS: ResourceSpec = ResourceSpec {
    path: "/business",
    collection: "business",
    added_label: "Business Car",
    deleted_label: "Business car",
    not_found: "Car not found",
};

/// Which set of resources a deployment serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteSet {
    #[default]
    Standard,
    Extended,
}

impl RouteSet {
    pub fn resources(self) -> &'static [ResourceSpec] {
        match self {
            RouteSet::Standard => &[CARS, COMMERCIAL_VEHICLES],
            RouteSet::Extended => &[CARS, COMMERCIAL_CARS, BUSINESS_CARS],
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(RouteSet::Standard),
            "extended" => Some(RouteSet::Extended),
            _ => None,
        }
    }
}
