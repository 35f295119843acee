use dnsguard_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Domain record type → hickory record type (for building queries)
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::PTR => HickoryRecordType::PTR,
            RecordType::SRV => HickoryRecordType::SRV,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::SVCB => HickoryRecordType::SVCB,
            RecordType::HTTPS => HickoryRecordType::HTTPS,
            RecordType::CAA => HickoryRecordType::CAA,
        }
    }

    /// Hickory record type → domain record type. `None` for types the
    /// pipeline does not handle.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<RecordType> {
        RecordType::from_u16(u16::from(hickory_type))
    }
}
