//! One plain GET with its response metadata printed.

use std::any::type_name;
use std::io::Write;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{Session, Transport};

/// GET `url` exactly as given, with no default headers.
pub fn fetch(url: &str) -> Result<HttpResponse, ApiError> {
    let session = Session::new(&ClientConfig::new(url));
    Ok(session.send(&HttpRequest::get(url.to_string()))?)
}

/// Print the response type, status, body type, body and cookies.
pub fn describe<W: Write>(response: &HttpResponse, out: &mut W) -> Result<(), ApiError> {
    let cookies: Vec<&str> = response.header_values("set-cookie").collect();
    let text = response.text();
    writeln!(out, "{}", type_name::<HttpResponse>())?;
    writeln!(out, "{}", response.status)?;
    writeln!(out, "{}", type_name_of(&*text))?;
    writeln!(out, "{text}")?;
    writeln!(out, "{cookies:?}")?;
    Ok(())
}

fn type_name_of<T: ?Sized>(_: &T) -> &'static str {
    type_name::<T>()
}
