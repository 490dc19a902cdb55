//! Operations of the Hosttech public API.
//!
//! The published WSDL types `recorddata` as `soap-enc:Array`; the server
//! only accepts an `xml-soap` Map there, which is what these descriptors say.

use crate::soap::{Kind, Operation, Param};

pub const GET_NUMBER_OF_ZONES: Operation = Operation {
    name: "getNumberOfZones",
    params: &[],
    returns: Kind::Int,
};

pub const GET_ZONE: Operation = Operation {
    name: "getZone",
    params: &[Param {
        name: "search",
        kind: Kind::String,
    }],
    returns: Kind::Map,
};

pub const ADD_RECORD: Operation = Operation {
    name: "addRecord",
    params: &[
        Param {
            name: "search",
            kind: Kind::String,
        },
        Param {
            name: "recorddata",
            kind: Kind::Map,
        },
    ],
    returns: Kind::Map,
};

pub const GET_RECORD: Operation = Operation {
    name: "getRecord",
    params: &[Param {
        name: "recordId",
        kind: Kind::Int,
    }],
    returns: Kind::Map,
};

pub const UPDATE_RECORD: Operation = Operation {
    name: "updateRecord",
    params: &[
        Param {
            name: "recordId",
            kind: Kind::String,
        },
        Param {
            name: "recorddata",
            kind: Kind::Map,
        },
    ],
    returns: Kind::Map,
};

pub const DELETE_RECORD: Operation = Operation {
    name: "deleteRecord",
    params: &[Param {
        name: "recordId",
        kind: Kind::String,
    }],
    returns: Kind::Bool,
};

pub const CHANGE_IP: Operation = Operation {
    name: "changeIp",
    params: &[
        Param {
            name: "currentIp",
            kind: Kind::String,
        },
        Param {
            name: "newIp",
            kind: Kind::String,
        },
    ],
    returns: Kind::Int,
};

pub const CHANGE_TTL: Operation = Operation {
    name: "changeTTL",
    params: &[
        Param {
            name: "ip",
            kind: Kind::String,
        },
        Param {
            name: "ttl",
            kind: Kind::String,
        },
    ],
    returns: Kind::Int,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_data_is_a_map() {
        for op in [ADD_RECORD, UPDATE_RECORD] {
            assert_eq!(op.params[1].name, "recorddata");
            assert_eq!(op.params[1].kind, Kind::Map);
        }
    }
}
