//! The `read_*` family mapping XML elements to grammar nodes.
//!
//! Each function consumes exactly the XML subtree of one element. The
//! parser performs no include resolution and no filtering itself; after a
//! container's children are read it hands the content sequence to a
//! [`Finisher`], so every container type shares one post-processing pass.

use quick_xml::events::{BytesStart, Event};

use crate::settings_xml::error::Result;
use crate::settings_xml::reader::SettingsXmlReader;
use crate::settings_xml::types::*;

/// Post-processing hook run on each container's content sequence, after
/// its children are parsed and before returning to the parent.
pub(crate) trait Finisher {
    fn finish<C: ContentSlot>(
        &mut self,
        reader: &SettingsXmlReader<'_>,
        content: &mut Vec<C>,
    ) -> Result<()>;
}

/// No-op finisher, yields the raw tree exactly as written.
#[cfg(test)]
pub(crate) struct RawFinisher;

#[cfg(test)]
impl Finisher for RawFinisher {
    fn finish<C: ContentSlot>(
        &mut self,
        _reader: &SettingsXmlReader<'_>,
        _content: &mut Vec<C>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Read a whole document, returning its root element.
///
/// Any of the five grammar elements is accepted as the root; includes are
/// not, they only appear inside containers.
pub(crate) fn read_document<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    finisher: &mut F,
) -> Result<RootElement> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => return read_root_element(reader, &e, false, finisher),
            Event::Empty(e) => return read_root_element(reader, &e, true, finisher),
            Event::Text(_) | Event::CData(_) => {
                return Err(reader.error("Unexpected text content before the root element"));
            }
            Event::Eof => {
                return Err(reader.error("Unexpected end of document, no root element found"));
            }
            // XML declaration, doctype, comments and processing instructions
            _ => {}
        }
    }
}

fn read_root_element<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<RootElement> {
    let name = element_name(reader, start)?;
    match name.as_str() {
        "settingsConfig" => Ok(RootElement::SettingsConfig(read_settings_config(
            reader, start, is_empty, finisher,
        )?)),
        "category" => Ok(RootElement::Category(read_category(
            reader, start, is_empty, finisher,
        )?)),
        "section" => Ok(RootElement::Section(read_section(
            reader, start, is_empty, finisher,
        )?)),
        "group" => Ok(RootElement::Group(read_group(
            reader, start, is_empty, finisher,
        )?)),
        "entry" => Ok(RootElement::Entry(read_entry(reader, start, is_empty)?)),
        other => Err(reader.error(format!("Unexpected root element <{}>", other))),
    }
}

pub(crate) fn read_settings_config<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<SettingsConfig> {
    let mut config = SettingsConfig {
        filter: read_filter_info(reader, start)?,
        allow_search: read_bool_attribute(reader, start, "allowSearch", true)?,
        allow_restore: read_bool_attribute(reader, start, "allowRestore", true)?,
        content: Vec::new(),
    };

    if !is_empty {
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let child = read_config_child(reader, &e, false, finisher)?;
                    config.content.push(child);
                }
                Event::Empty(e) => {
                    let child = read_config_child(reader, &e, true, finisher)?;
                    config.content.push(child);
                }
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <settingsConfig>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <settingsConfig>"));
                }
                _ => {}
            }
        }
    }

    finisher.finish(reader, &mut config.content)?;
    Ok(config)
}

fn read_config_child<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<ConfigContent> {
    let name = element_name(reader, start)?;
    match name.as_str() {
        "include" => Ok(ConfigContent::Include(read_include(
            reader, start, is_empty,
        )?)),
        "category" => Ok(ConfigContent::Category(read_category(
            reader, start, is_empty, finisher,
        )?)),
        "section" => Ok(ConfigContent::Section(read_section(
            reader, start, is_empty, finisher,
        )?)),
        "group" => Ok(ConfigContent::Group(read_group(
            reader, start, is_empty, finisher,
        )?)),
        "entry" => Ok(ConfigContent::Entry(read_entry(reader, start, is_empty)?)),
        other => Err(reader.error(format!("Unexpected element <{}> in <settingsConfig>", other))),
    }
}

pub(crate) fn read_category<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<Category> {
    let mut category = Category {
        filter: read_filter_info(reader, start)?,
        title: get_attribute(reader, start, "title")?,
        icon: get_attribute(reader, start, "icon")?,
        tooltip: get_attribute(reader, start, "tooltip")?,
        content: Vec::new(),
    };

    if !is_empty {
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let child = read_category_child(reader, &e, false, finisher)?;
                    category.content.push(child);
                }
                Event::Empty(e) => {
                    let child = read_category_child(reader, &e, true, finisher)?;
                    category.content.push(child);
                }
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <category>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <category>"));
                }
                _ => {}
            }
        }
    }

    finisher.finish(reader, &mut category.content)?;
    Ok(category)
}

fn read_category_child<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<CategoryContent> {
    let name = element_name(reader, start)?;
    match name.as_str() {
        "include" => Ok(CategoryContent::Include(read_include(
            reader, start, is_empty,
        )?)),
        "section" => Ok(CategoryContent::Section(read_section(
            reader, start, is_empty, finisher,
        )?)),
        "group" => Ok(CategoryContent::Group(read_group(
            reader, start, is_empty, finisher,
        )?)),
        "entry" => Ok(CategoryContent::Entry(read_entry(reader, start, is_empty)?)),
        other => Err(reader.error(format!("Unexpected element <{}> in <category>", other))),
    }
}

pub(crate) fn read_section<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<Section> {
    let mut section = Section {
        filter: read_filter_info(reader, start)?,
        title: get_attribute(reader, start, "title")?,
        icon: get_attribute(reader, start, "icon")?,
        tooltip: get_attribute(reader, start, "tooltip")?,
        content: Vec::new(),
    };

    if !is_empty {
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let child = read_section_child(reader, &e, false, finisher)?;
                    section.content.push(child);
                }
                Event::Empty(e) => {
                    let child = read_section_child(reader, &e, true, finisher)?;
                    section.content.push(child);
                }
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <section>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <section>"));
                }
                _ => {}
            }
        }
    }

    finisher.finish(reader, &mut section.content)?;
    Ok(section)
}

fn read_section_child<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<SectionContent> {
    let name = element_name(reader, start)?;
    match name.as_str() {
        "include" => Ok(SectionContent::Include(read_include(
            reader, start, is_empty,
        )?)),
        "group" => Ok(SectionContent::Group(read_group(
            reader, start, is_empty, finisher,
        )?)),
        "entry" => Ok(SectionContent::Entry(read_entry(reader, start, is_empty)?)),
        other => Err(reader.error(format!("Unexpected element <{}> in <section>", other))),
    }
}

pub(crate) fn read_group<F: Finisher>(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
    finisher: &mut F,
) -> Result<Group> {
    let mut group = Group {
        filter: read_filter_info(reader, start)?,
        title: get_attribute(reader, start, "title")?,
        tooltip: get_attribute(reader, start, "tooltip")?,
        content: Vec::new(),
    };

    if !is_empty {
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let child = read_group_child(reader, &e, false)?;
                    group.content.push(child);
                }
                Event::Empty(e) => {
                    let child = read_group_child(reader, &e, true)?;
                    group.content.push(child);
                }
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <group>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <group>"));
                }
                _ => {}
            }
        }
    }

    finisher.finish(reader, &mut group.content)?;
    Ok(group)
}

fn read_group_child(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
) -> Result<GroupContent> {
    let name = element_name(reader, start)?;
    match name.as_str() {
        "include" => Ok(GroupContent::Include(read_include(
            reader, start, is_empty,
        )?)),
        "entry" => Ok(GroupContent::Entry(read_entry(reader, start, is_empty)?)),
        other => Err(reader.error(format!("Unexpected element <{}> in <group>", other))),
    }
}

pub(crate) fn read_entry(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
) -> Result<Entry> {
    let filter = read_filter_info(reader, start)?;
    let key = match get_attribute(reader, start, "key")? {
        Some(key) if !key.is_empty() => key,
        Some(_) => return Err(reader.error("Empty required attribute \"key\" on <entry>")),
        None => return Err(reader.error("Missing required attribute \"key\" on <entry>")),
    };
    let input_type = match get_attribute(reader, start, "type")? {
        Some(input_type) => input_type,
        None => return Err(reader.error("Missing required attribute \"type\" on <entry>")),
    };

    let mut entry = Entry {
        filter,
        key,
        input_type,
        title: get_attribute(reader, start, "title")?,
        tooltip: get_attribute(reader, start, "tooltip")?,
        default_value: get_attribute(reader, start, "defaultValue")?,
        search_keys: Vec::new(),
        properties: Vec::new(),
    };

    if !is_empty {
        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(reader, &e)?.as_str() {
                    "searchKey" => entry.search_keys.push(read_text(reader)?),
                    "property" => {
                        let name = match get_attribute(reader, &e, "name")? {
                            Some(name) => name,
                            None => {
                                return Err(reader
                                    .error("Missing required attribute \"name\" on <property>"));
                            }
                        };
                        entry.properties.push((name, read_text(reader)?));
                    }
                    other => {
                        return Err(reader.error(format!("Unexpected element <{}> in <entry>", other)));
                    }
                },
                Event::Empty(e) => match element_name(reader, &e)?.as_str() {
                    "searchKey" => entry.search_keys.push(String::new()),
                    "property" => {
                        let name = match get_attribute(reader, &e, "name")? {
                            Some(name) => name,
                            None => {
                                return Err(reader
                                    .error("Missing required attribute \"name\" on <property>"));
                            }
                        };
                        entry.properties.push((name, String::new()));
                    }
                    other => {
                        return Err(reader.error(format!("Unexpected element <{}> in <entry>", other)));
                    }
                },
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <entry>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <entry>"));
                }
                _ => {}
            }
        }
    }

    Ok(entry)
}

pub(crate) fn read_include(
    reader: &mut SettingsXmlReader<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
) -> Result<Include> {
    let filter = read_filter_info(reader, start)?;
    let path = match get_attribute(reader, start, "path")? {
        Some(path) => path,
        None => return Err(reader.error("Missing required attribute \"path\" on <include>")),
    };
    let optional = read_bool_attribute(reader, start, "optional", false)?;

    if !is_empty {
        // <include> declares no children, only whitespace is tolerated
        loop {
            match reader.read_event()? {
                Event::End(_) => break,
                Event::Start(e) | Event::Empty(e) => {
                    let name = element_name(reader, &e)?;
                    return Err(reader.error(format!("Unexpected element <{}> in <include>", name)));
                }
                Event::Text(_) | Event::CData(_) => {
                    return Err(reader.error("Unexpected text content in <include>"));
                }
                Event::Eof => {
                    return Err(reader.error("Unexpected end of document inside <include>"));
                }
                _ => {}
            }
        }
    }

    Ok(Include {
        filter,
        path,
        optional,
    })
}

fn read_filter_info(reader: &SettingsXmlReader<'_>, start: &BytesStart<'_>) -> Result<FilterInfo> {
    Ok(FilterInfo {
        frontends: get_attribute(reader, start, "frontends")?,
        selectors: get_attribute(reader, start, "selectors")?,
    })
}

/// Read text content until the element's closing tag.
fn read_text(reader: &mut SettingsXmlReader<'_>) -> Result<String> {
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => match e.unescape() {
                Ok(t) => text.push_str(&t),
                Err(e) => return Err(reader.error(format!("Invalid text content: {}", e))),
            },
            Event::Start(e) | Event::Empty(e) => {
                let name = element_name(reader, &e)?;
                return Err(reader.error(format!("Unexpected element <{}>, expected text", name)));
            }
            Event::End(_) => break,
            Event::Eof => return Err(reader.error("Unexpected end of document, expected text")),
            _ => {}
        }
    }

    Ok(text)
}

fn element_name(reader: &SettingsXmlReader<'_>, element: &BytesStart<'_>) -> Result<String> {
    let name = element.name();
    match std::str::from_utf8(name.as_ref()) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(reader.error("Element name is not valid UTF-8")),
    }
}

/// Get an attribute value from an element. Unknown attributes are ignored
/// by the callers, but a present attribute must decode cleanly.
fn get_attribute(
    reader: &SettingsXmlReader<'_>,
    element: &BytesStart<'_>,
    name: &str,
) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = match attribute {
            Ok(a) => a,
            Err(e) => return Err(reader.error(format!("Invalid attribute: {}", e))),
        };
        if attribute.key.as_ref() == name.as_bytes() {
            let value = match attribute.unescape_value() {
                Ok(v) => v,
                Err(e) => {
                    return Err(
                        reader.error(format!("Invalid value for attribute \"{}\": {}", name, e))
                    );
                }
            };
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn read_bool_attribute(
    reader: &SettingsXmlReader<'_>,
    element: &BytesStart<'_>,
    name: &str,
    default: bool,
) -> Result<bool> {
    match get_attribute(reader, element, name)? {
        Some(value) => match value.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(reader.error(format!(
                "Invalid boolean value \"{}\" for attribute \"{}\"",
                other, name
            ))),
        },
        None => Ok(default),
    }
}
