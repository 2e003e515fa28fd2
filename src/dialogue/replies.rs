//! Reply texts, menus and the canned FAQ table

const MENU_OPTIONS: &str = "¿Qué tipo de ayuda necesitas? Responde con el número de la opción:\n\n\
1️⃣ Automatizar procesos\n\
2️⃣ Información sobre servicios\n\
3️⃣ Contactar con un asesor (WhatsApp, Correo o Videollamada)\n\n\
Escribe 'Salir' para reiniciar en cualquier momento.";

pub fn welcome() -> String {
    format!("¡Hola! Soy el asistente virtual de DigitalMatchGlobal. 🚀\n\n{MENU_OPTIONS}")
}

pub fn restart() -> String {
    format!(
        "🔄 Conversación reiniciada. \n\n¡Hola! Soy el asistente virtual de DigitalMatchGlobal. 🚀\n\n{MENU_OPTIONS}"
    )
}

pub fn welcome_back() -> String {
    format!("¡Hola de nuevo! Soy el asistente virtual de DigitalMatchGlobal. 🚀\n\n{MENU_OPTIONS}")
}

pub const MENU_ACK: &str = "¡Genial! 😊 Si necesitas más información, dime en qué puedo ayudarte.";
pub const MENU_INVALID: &str =
    "Por favor, selecciona una opción válida (1, 2 o 3). Escribe 'Salir' para reiniciar.";

pub const AREA_MENU: &str = "¡Genial! ¿En qué área necesitas automatizar?\n\
1️⃣ Ventas\n2️⃣ Marketing\n3️⃣ Finanzas\n4️⃣ Operaciones\n5️⃣ Atención al cliente\n6️⃣ Otros";
pub const AREA_INVALID: &str = "Por favor, selecciona un número válido entre 1 y 6.";
pub const ASK_AREA_DESCRIPTION: &str = "Por favor, describe en qué área necesitas automatización:";

pub const AUTOMATION_TYPE_MENU: &str =
    "¡Perfecto! ¿Qué problema o tarea específica te gustaría automatizar?\n\
1️⃣ CRM\n2️⃣ Gestión de clientes\n3️⃣ Análisis de datos\n4️⃣ Otros";
pub const AUTOMATION_TYPE_MENU_AFTER_AREA: &str =
    "¡Gracias! Ahora dime qué tipo de automatización necesitas:\n\
1️⃣ CRM\n2️⃣ Gestión de clientes\n3️⃣ Análisis de datos\n4️⃣ Otros";
pub const AUTOMATION_TYPE_INVALID: &str = "Por favor, selecciona un número válido entre 1 y 4.";
pub const ASK_TYPE_DESCRIPTION: &str = "Por favor, describe qué tipo de automatización necesitas:";
pub const ADVISOR_WILL_CONTACT: &str = "¡Gracias! Un asesor se pondrá en contacto contigo pronto.";

pub const SERVICES_INFO: &str = "Ofrecemos soluciones de automatización en diferentes áreas como \
ventas, marketing, finanzas y atención al cliente. Para más detalles, visita nuestro sitio web: \
https://digitalmatchglobal.com";
pub const SERVICES_ACK: &str =
    "¡Entendido! 😊 Si necesitas más información, dime en qué puedo ayudarte.";
pub const SERVICES_NOT_UNDERSTOOD: &str = "No entendí tu mensaje. Si necesitas más información, \
dime en qué puedo ayudarte o escribe 'Hola' para reiniciar.";

pub const CONTACT_MENU: &str = "¿Cómo prefieres ser contactado?\n\
1️⃣ Agendar una videollamada 📅\n\
2️⃣ Que un asesor te escriba por WhatsApp 📲\n\
3️⃣ Que un asesor te envíe un email 📧";
pub const CONTACT_INVALID: &str = "Por favor, selecciona una opción válida (1, 2 o 3).";
pub const VIDEO_CALL: &str = "📅 Puedes agendar una consulta directamente en este enlace:\n\
🔗 https://calendly.com/digitalmatch-global/30min\n\n\
¡Espero tu reserva! 😊";
pub const WHATSAPP_ADVISOR: &str =
    "Un asesor se pondrá en contacto contigo pronto por WhatsApp. 📲";
pub const ASK_EMAIL: &str = "Por favor, envíame tu email para que podamos contactarte.";
pub const EMAIL_RECEIVED: &str = "¡Gracias! Nos pondremos en contacto contigo pronto.";
pub const EMAIL_INVALID: &str = "Por favor, ingresa un email válido.";

pub const BUDGET_RECEIVED: &str =
    "¡Gracias! Vamos a analizar tu requerimiento para enviarte un presupuesto detallado.";
pub const FOLLOW_UP_RECEIVED: &str =
    "Estamos revisando tu consulta. Pronto recibirás una actualización.";

pub const FALLBACK_ACK: &str =
    "¡Entendido! 😊 Si necesitas más ayuda, dime cómo puedo asistirte.";
pub const FALLBACK_NOT_UNDERSTOOD: &str = "No entendí tu mensaje. Por favor, selecciona una \
opción válida o escribe 'Salir' para volver al menú principal.";

const AREAS: [(&str, &str); 5] = [
    ("1", "1️⃣ Ventas"),
    ("2", "2️⃣ Marketing"),
    ("3", "3️⃣ Finanzas"),
    ("4", "4️⃣ Operaciones"),
    ("5", "5️⃣ Atención al cliente"),
];

const AUTOMATION_TYPES: [(&str, &str); 3] = [
    ("1", "🚀 CRM para ventas"),
    ("2", "📊 Gestión de clientes"),
    ("3", "📈 Análisis de datos"),
];

const FAQ: [(&str, &str); 6] = [
    (
        "precio",
        "💰 Los precios dependen del tipo de automatización que necesites. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
    (
        "soporte",
        "🛠️ Sí, ofrecemos soporte técnico. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
    (
        "países",
        "🌎 Trabajamos en EEUU y Latinoamérica. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
    (
        "duración",
        "⏳ El tiempo de implementación depende del proceso a automatizar. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
    (
        "integraciones",
        "🔗 Nuestras soluciones pueden integrarse con diversas plataformas. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
    (
        "seguridad",
        "🔒 La seguridad de los datos es nuestra prioridad. Implementamos encriptación y protocolos avanzados. Más info: https://digitalmatchglobal.com. Contacto: info@digitalmatchglobal.com",
    ),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

/// Area label for menu choices 1-5
pub fn area_label(choice: &str) -> Option<&'static str> {
    lookup(&AREAS, choice)
}

/// Automation type label for menu choices 1-3
pub fn automation_type_label(choice: &str) -> Option<&'static str> {
    lookup(&AUTOMATION_TYPES, choice)
}

/// Canned answer for an exact FAQ key
pub fn faq_answer(key: &str) -> Option<&'static str> {
    lookup(&FAQ, key)
}

#[allow(dead_code)] // Used in tests
pub fn faq_keys() -> impl Iterator<Item = &'static str> {
    FAQ.iter().map(|(key, _)| *key)
}
