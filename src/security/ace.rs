//! MS-DTYP 2.4.4: ACE

use binrw::prelude::*;

use crate::{guid::Guid, Error};

use super::{AccessMask, AceFlags, AceType, ObjectAceFlags, SID};

/// An access control entry.
///
/// All ACE types share one layout: a header, an access mask, object flags and GUIDs
/// (object types only), the trustee SID, then opaque application data up to the
/// declared size. Application data (callback conditions, resource attributes, ...)
/// is kept verbatim.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone)]
#[brw(little)]
pub struct ACE {
    pub ace_type: AceType,
    pub ace_flags: AceFlags,
    #[bw(try_calc = u16::try_from(Self::wire_size(ace_type, object_type, inherited_object_type, sid, application_data)))]
    #[br(temp)]
    #[br(assert(ace_size % 4 == 0, "ACE size {} is not a multiple of 4", ace_size))]
    ace_size: u16,
    pub access_mask: AccessMask,

    /// Present iff the type is an object ACE type.
    /// The presence bits are derived from the GUIDs when writing.
    #[br(if(ace_type.is_object()))]
    #[bw(assert(
        object_flags.is_some() == ace_type.is_object(),
        "object flags do not match ACE type {:?}",
        ace_type
    ))]
    #[bw(map = |flags: &Option<ObjectAceFlags>| flags.map(|f| {
        f.with_object_type_present(object_type.is_some())
            .with_inherited_object_type_present(inherited_object_type.is_some())
    }))]
    pub object_flags: Option<ObjectAceFlags>,
    #[br(if(object_flags.is_some_and(|f| f.object_type_present())))]
    #[bw(assert(object_type.is_none() || ace_type.is_object(), "object type on a non-object ACE"))]
    pub object_type: Option<Guid>,
    #[br(if(object_flags.is_some_and(|f| f.inherited_object_type_present())))]
    #[bw(assert(
        inherited_object_type.is_none() || ace_type.is_object(),
        "inherited object type on a non-object ACE"
    ))]
    pub inherited_object_type: Option<Guid>,

    #[br(assert(
        Self::fixed_size(&ace_type, &object_type, &inherited_object_type, &sid) <= usize::from(ace_size),
        "ACE size {} is smaller than its content",
        ace_size
    ))]
    pub sid: SID,

    #[br(count = usize::from(ace_size) - Self::fixed_size(&ace_type, &object_type, &inherited_object_type, &sid))]
    #[bw(assert(
        application_data.len() % 4 == 0,
        "application data length {} is not a multiple of 4",
        application_data.len()
    ))]
    pub application_data: Vec<u8>,
}

impl ACE {
    const HEADER_SIZE: usize = 8;
    const OBJECT_FLAGS_SIZE: usize = 4;

    /// A new entry of type `ace_type` for `sid`, with no flags and no rights.
    pub fn new(ace_type: AceType, sid: SID) -> Self {
        Self {
            ace_type,
            ace_flags: AceFlags::new(),
            access_mask: AccessMask::new(),
            object_flags: ace_type.is_object().then(ObjectAceFlags::new),
            object_type: None,
            inherited_object_type: None,
            sid,
            application_data: Vec::new(),
        }
    }

    pub fn with_flags(mut self, ace_flags: AceFlags) -> Self {
        self.ace_flags = ace_flags;
        self
    }

    pub fn with_access_mask(mut self, access_mask: AccessMask) -> Self {
        self.access_mask = access_mask;
        self
    }

    /// Restricts the entry to an object class, property or extended right.
    pub fn with_object_type(mut self, object_type: Guid) -> crate::Result<Self> {
        let flags = self.object_flags_mut("object type")?;
        *flags = flags.with_object_type_present(true);
        self.object_type = Some(object_type);
        Ok(self)
    }

    /// Restricts inheritance of the entry to objects of a class.
    pub fn with_inherited_object_type(mut self, inherited_object_type: Guid) -> crate::Result<Self> {
        let flags = self.object_flags_mut("inherited object type")?;
        *flags = flags.with_inherited_object_type_present(true);
        self.inherited_object_type = Some(inherited_object_type);
        Ok(self)
    }

    pub fn with_application_data(mut self, application_data: Vec<u8>) -> crate::Result<Self> {
        if application_data.len() % 4 != 0 {
            return Err(Error::InvalidArgument(format!(
                "application data length {} is not a multiple of 4",
                application_data.len()
            )));
        }
        self.application_data = application_data;
        Ok(self)
    }

    fn object_flags_mut(&mut self, what: &str) -> crate::Result<&mut ObjectAceFlags> {
        let ace_type = self.ace_type;
        self.object_flags.as_mut().ok_or_else(|| {
            Error::InvalidArgument(format!("{what} is not supported by {ace_type:?} entries"))
        })
    }

    /// Whether the entry was inherited from a parent object.
    pub fn is_inherited(&self) -> bool {
        self.ace_flags.inherited()
    }

    /// The encoded size of the entry, in bytes.
    pub fn size(&self) -> usize {
        Self::wire_size(
            &self.ace_type,
            &self.object_type,
            &self.inherited_object_type,
            &self.sid,
            &self.application_data,
        )
    }

    /// Size of everything but the application data.
    fn fixed_size(
        ace_type: &AceType,
        object_type: &Option<Guid>,
        inherited_object_type: &Option<Guid>,
        sid: &SID,
    ) -> usize {
        let mut size = Self::HEADER_SIZE + sid.size();
        if ace_type.is_object() {
            size += Self::OBJECT_FLAGS_SIZE;
        }
        size += Guid::GUID_SIZE * (object_type.iter().count() + inherited_object_type.iter().count());
        size
    }

    fn wire_size(
        ace_type: &AceType,
        object_type: &Option<Guid>,
        inherited_object_type: &Option<Guid>,
        sid: &SID,
        application_data: &[u8],
    ) -> usize {
        Self::fixed_size(ace_type, object_type, inherited_object_type, sid) + application_data.len()
    }
}

impl std::fmt::Display for ACE {
    /// SDDL ace string: `(type;flags;rights;object_guid;inherit_object_guid;account_sid)`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({};{};{};",
            self.ace_type,
            self.ace_flags.to_sddl(),
            self.access_mask.to_sddl()
        )?;
        if let Some(object_type) = &self.object_type {
            write!(f, "{object_type}")?;
        }
        write!(f, ";")?;
        if let Some(inherited_object_type) = &self.inherited_object_type {
            write!(f, "{inherited_object_type}")?;
        }
        write!(f, ";{})", self.sid)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{guid, security::AceFlag, WireFormat};

    use super::*;

    const COMPUTER: Guid = guid!("bf967a86-0de6-11d0-a285-00aa003049e2");

    #[test]
    fn test_access_allowed_ace() {
        let data = [
            0x00, 0x13, 0x24, 0x00, 0xff, 0x01, 0x1f, 0x00, // header, mask
            0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0x17, 0x3d,
            0xa7, 0x2e, 0x95, 0x56, 0x53, 0xf9, 0x15, 0xdf, 0xf2, 0x80, 0xe9, 0x03, 0x00, 0x00,
        ];
        let ace = ACE::parse(&data).unwrap();
        assert_eq!(ace.ace_type, AceType::AccessAllowed);
        assert!(ace.is_inherited());
        assert_eq!(u32::from(ace.access_mask), 0x1f01ff);
        assert_eq!(ace.object_flags, None);
        assert_eq!(
            ace.sid,
            SID::from_str("S-1-5-21-782712087-4182988437-2163400469-1001").unwrap()
        );
        assert!(ace.application_data.is_empty());
        assert_eq!(ace.size(), data.len());
        assert_eq!(ace.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_object_ace_with_guids() {
        let ace = ACE::new(AceType::AccessAllowedObject, SID::from_str(SID::S_SELF).unwrap())
            .with_flags(AceFlags::new().with(AceFlag::ContainerInherit))
            .with_access_mask(AccessMask::from(AccessMask::CONTROL_ACCESS))
            .with_object_type(guid!("00299570-246d-11d0-a768-00aa006e0529"))
            .unwrap()
            .with_inherited_object_type(COMPUTER)
            .unwrap();
        assert_eq!(ace.size(), 8 + 4 + 32 + 12);

        let bytes = ace.to_bytes().unwrap();
        assert_eq!(bytes.len(), ace.size());
        assert_eq!(&bytes[..4], &[0x05, 0x02, 0x38, 0x00]);
        // Both presence bits are written.
        assert_eq!(&bytes[8..12], &[0x03, 0x00, 0x00, 0x00]);
        assert_eq!(ACE::parse(&bytes).unwrap(), ace);
        assert_eq!(
            ace.to_string(),
            "(OA;CI;CR;00299570-246d-11d0-a768-00aa006e0529;bf967a86-0de6-11d0-a285-00aa003049e2;S-1-5-10)"
        );
    }

    #[test]
    fn test_object_ace_without_guids() {
        let data = [
            0x06, 0x00, 0x18, 0x00, 0x00, 0x01, 0x00, 0x00, // header, mask
            0x00, 0x00, 0x00, 0x00, // object flags
            0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // S-1-1-0
        ];
        let ace = ACE::parse(&data).unwrap();
        assert_eq!(ace.ace_type, AceType::AccessDeniedObject);
        assert_eq!(ace.object_flags, Some(ObjectAceFlags::new()));
        assert_eq!(ace.object_type, None);
        assert_eq!(ace.to_bytes().unwrap(), data);
        assert_eq!(ace.to_string(), "(OD;;CR;;;S-1-1-0)");
    }

    #[test]
    fn test_callback_ace_application_data() {
        let ace = ACE::new(AceType::AccessAllowedCallback, SID::from_str(SID::S_EVERYONE).unwrap())
            .with_application_data(vec![0x61, 0x72, 0x74, 0x78, 0x01, 0x00, 0x00, 0x00])
            .unwrap();
        let bytes = ace.to_bytes().unwrap();
        assert_eq!(bytes.len(), 8 + 12 + 8);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]) as usize, bytes.len());
        assert_eq!(ACE::parse(&bytes).unwrap(), ace);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let sid = SID::from_str(SID::S_EVERYONE).unwrap();
        assert!(matches!(
            ACE::new(AceType::AccessAllowed, sid.clone()).with_object_type(COMPUTER),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ACE::new(AceType::AccessAllowed, sid).with_application_data(vec![1, 2, 3]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_write_rejects_inconsistent_ace() {
        let mut ace = ACE::new(AceType::AccessAllowed, SID::from_str(SID::S_EVERYONE).unwrap());
        ace.object_type = Some(COMPUTER);
        assert!(matches!(ace.to_bytes(), Err(Error::InvalidState(_))));

        let mut ace = ACE::new(AceType::AccessAllowed, SID::from_str(SID::S_EVERYONE).unwrap());
        ace.application_data = vec![0; 2];
        assert!(matches!(ace.to_bytes(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_parse_rejects_bad_size() {
        let mut data = vec![
            0x00, 0x00, 0x14, 0x00, 0x01, 0x00, 0x00, 0x00, // header, mask
            0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // S-1-1-0
        ];
        assert!(ACE::parse(&data).is_ok());
        // Not a multiple of 4.
        data[2] = 0x15;
        assert!(matches!(ACE::parse(&data), Err(Error::MalformedInput(_))));
        // Smaller than the SID it holds.
        data[2] = 0x10;
        assert!(matches!(ACE::parse(&data), Err(Error::MalformedInput(_))));
        // Larger than the buffer.
        data[2] = 0x18;
        assert!(matches!(ACE::parse(&data), Err(Error::MalformedInput(_))));
        // Unknown type.
        data[2] = 0x14;
        data[0] = 0x20;
        assert!(matches!(ACE::parse(&data), Err(Error::MalformedInput(_))));
    }
}
