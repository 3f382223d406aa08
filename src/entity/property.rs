use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// The strong type of the values a property can take.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyType {
    String,
    Integer,
    Double,
    Bool,
    JavaScript,
}

impl PropertyType {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::String),
            1 => Some(Self::Integer),
            2 => Some(Self::Double),
            3 => Some(Self::Bool),
            4 => Some(Self::JavaScript),
            _ => None,
        }
    }
}

/// A typed attribute of a device, such as `IsMobile`.
///
/// Properties are always resident and additionally indexed by name. The
/// value-index range `[first_value_index, last_value_index]` delimits the
/// property's rows in the values section.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub component_index: u8,
    pub display_order: u8,
    pub mandatory: bool,
    pub list: bool,
    pub show_values: bool,
    pub obsolete: bool,
    pub show: bool,
    pub value_type: PropertyType,
    pub default_value_index: i32,
    pub name_offset: i32,
    pub description_offset: i32,
    pub category_offset: i32,
    pub url_offset: i32,
    pub first_value_index: i32,
    pub last_value_index: i32,
    pub map_count: i32,
    pub first_map_index: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyFactory;

impl PropertyFactory {
    const RECORD_LENGTH: usize = 44;
}

impl EntityFactory for PropertyFactory {
    type Entity = Property;

    fn create(
        &self,
        _key: i32,
        reader: &mut BinaryReader,
    ) -> Result<Property, DatasetError> {
        let record_offset = reader.position();

        let component_index = reader.read_u8()?;
        let display_order = reader.read_u8()?;
        let mandatory = reader.read_u8()? != 0;
        let list = reader.read_u8()? != 0;
        let show_values = reader.read_u8()? != 0;
        let obsolete = reader.read_u8()? != 0;
        let show = reader.read_u8()? != 0;
        let value_type = PropertyType::from_raw(reader.read_u8()?).ok_or(
            DatasetError::Malformed {
                section: "properties",
                offset: record_offset,
                detail: "unknown property value type",
            },
        )?;

        Ok(Property {
            component_index,
            display_order,
            mandatory,
            list,
            show_values,
            obsolete,
            show,
            value_type,
            default_value_index: reader.read_i32()?,
            name_offset: reader.read_i32()?,
            description_offset: reader.read_i32()?,
            category_offset: reader.read_i32()?,
            url_offset: reader.read_i32()?,
            first_value_index: reader.read_i32()?,
            last_value_index: reader.read_i32()?,
            map_count: reader.read_i32()?,
            first_map_index: reader.read_i32()?,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &Property) -> Option<usize> {
        None
    }
}
